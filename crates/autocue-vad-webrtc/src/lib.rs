mod webrtc_engine;

pub use webrtc_engine::WebRtcEngine;
