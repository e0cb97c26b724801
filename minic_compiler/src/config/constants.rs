pub mod compile_time {
    pub mod source {
        /// Columns a tab character advances the scanner position by
        pub const TAB_WIDTH: u32 = 4;

        /// Read buffer capacity used when opening source files
        pub const READ_BUFFER_SIZE: usize = 8 * 1024;
    }

    pub mod driver {
        /// Write buffer capacity used for token dump destinations
        pub const WRITE_BUFFER_SIZE: usize = 8 * 1024;

        /// Line separator used between dumped tokens
        #[cfg(windows)]
        pub const LINE_SEPARATOR: &str = "\r\n";

        /// Line separator used between dumped tokens
        #[cfg(not(windows))]
        pub const LINE_SEPARATOR: &str = "\n";
    }

    pub mod logging {
        /// Capacity hint for in-memory log collection
        /// RESOURCE: Bounds memory used by MemoryLogger in long runs
        pub const LOG_BUFFER_SIZE: usize = 10_000;

        /// Maximum log message length; longer messages are truncated
        pub const MAX_LOG_MESSAGE_LENGTH: usize = 4096;
    }
}
