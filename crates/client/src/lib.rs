pub mod tempo;

pub use tempo::TempoClient;
