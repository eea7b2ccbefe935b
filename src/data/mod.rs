//! Performance data: synthetic generation and tabular import/export.

pub mod export;
pub mod simulate;
pub mod table;

pub use simulate::{generate, generate_seeded, DailyRecord, SimulationConfig};
