//! Shared SPI bus abstraction
//!
//! The bus is a single host peripheral multiplexed between the LCD and the
//! SD card by chip-select. Implementations are cheap handles: the board hands
//! a reference to the display and storage factories, which take whatever
//! share of the bus their driver needs.

/// SPI host bus.
pub trait SpiBus {
    /// Error type
    type Error: core::fmt::Debug;

    /// Claim the host peripheral and configure DMA for the pin triple the
    /// handle was created with.
    fn init(&mut self) -> Result<(), Self::Error>;
}
