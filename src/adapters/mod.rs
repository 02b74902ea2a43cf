pub mod composition;
pub mod engine;
pub mod fake_provider;
pub mod merger;
pub mod overrides;
pub mod pattern;
pub mod schema_loader;
pub mod smart_defaults;
pub mod structural;

#[cfg(test)]
mod engine_test;
