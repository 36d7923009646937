//! Custom widgets for the TUI

mod bars;

pub use bars::QuantityBars;
