pub mod ids;
pub mod paths;
pub mod validation;

pub use ids::new_id;
pub use paths::AppPaths;
pub use validation::FieldError;
