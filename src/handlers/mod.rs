// Route handlers, one module per resource group.
pub mod habits;
pub mod tags;
pub mod utils;
