//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter       | Implements    | Connects to                     |
//! |---------------|---------------|---------------------------------|
//! | `simulated`   | SensorPort    | Fixed readings (dev / test)     |
//! |               | ActuatorPort  | In-memory fan and pump state    |
//! | `relay`       | ActuatorPort  | `embedded-hal` GPIO relay board |
//! | `log_sink`    | EventSink     | `log` facade (text or JSON)     |
//! | `config_file` | ConfigPort    | JSON config file on disk        |

pub mod config_file;
pub mod log_sink;
pub mod relay;
pub mod simulated;
