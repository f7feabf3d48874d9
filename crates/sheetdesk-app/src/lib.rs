// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod backend;
pub mod error;
pub mod forms;
pub mod grid;
pub mod model;
pub mod session;
pub mod table;
pub mod validation;

pub use backend::*;
pub use error::*;
pub use forms::*;
pub use grid::*;
pub use model::*;
pub use session::*;
pub use table::*;
