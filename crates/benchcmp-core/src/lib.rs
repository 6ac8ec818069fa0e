#![deny(missing_docs)]
#![doc = "Value model, error taxonomy, and seeded RNG handles shared by the benchmark comparison engine."]

mod de;
pub mod errors;
pub mod rng;
pub mod ser;
pub mod value;

pub use errors::{BenchError, ErrorInfo};
pub use rng::{derive_labelled_seed, derive_substream_seed, RngHandle};
pub use ser::to_value;
pub use value::{decode, decode_slice, JsonValue, Mapping};
