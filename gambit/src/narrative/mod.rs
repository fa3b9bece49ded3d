mod catalog;
mod selector;

pub use catalog::{template, TemplateSpec, CATALOG};
pub use selector::{NarrativeSelector, Rule, RulePredicate, RULES};
