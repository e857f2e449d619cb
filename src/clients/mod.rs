pub mod gemini;
pub mod openfoodfacts;
pub mod traits;

pub use gemini::GeminiClient;
pub use openfoodfacts::OpenFoodFactsClient;
pub use traits::{ClientError, GenerativeModel, ProductInfo, ProductLookup};
