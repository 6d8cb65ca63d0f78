// Audio services module
// Local playback, MP3 export and duration probing

pub mod export;
pub mod playback;
pub mod probe;

pub use export::save_audio;
pub use playback::{AudioPlayer, RodioPlayer, play_in_background};
pub use probe::audio_duration;
