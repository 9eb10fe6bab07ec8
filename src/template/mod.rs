pub mod exclusion;
pub mod resolver;

pub use exclusion::{HeaderRules, apply_exclusions};
pub use resolver::TemplateResolver;
