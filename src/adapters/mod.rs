//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter       | Implements   | Connects to                  |
//! |---------------|--------------|------------------------------|
//! | `config_file` | ConfigPort   | JSON file on disk            |
//! | `host`        | HostPort     | JSON lines on stdout         |
//! | `log_sink`    | EventSink    | `log` facade                 |
//! | `time`        | ClockPort    | System wall clock / pinned   |

pub mod config_file;
pub mod host;
pub mod log_sink;
pub mod time;
