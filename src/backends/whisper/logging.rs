use std::os::raw::{c_char, c_void};
use std::sync::Once;

/// Swallows whisper.cpp's own log output; the run log is ours to write.
unsafe extern "C" fn discard_whisper_log(
    _level: u32,
    _c_msg: *const c_char,
    _user_data: *mut c_void,
) {
}

/// Silence whisper.cpp logging, once for the lifetime of the process.
pub(super) fn silence_whisper_logging() {
    static INIT: Once = Once::new();

    INIT.call_once(|| unsafe {
        whisper_rs::set_log_callback(Some(discard_whisper_log), std::ptr::null_mut());
    });
}
