// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod context;
pub mod detail;
pub mod filter;
pub mod ids;
pub mod model;
pub mod selectors;
pub mod state;
pub mod tree;
pub mod views;

pub use context::*;
pub use detail::*;
pub use filter::*;
pub use ids::*;
pub use model::*;
pub use selectors::*;
pub use state::*;
pub use tree::*;
pub use views::*;
