//! # punchguard-ffi
//!
//! C-compatible FFI interface for PunchGuard.
//!
//! This crate provides a stable C ABI for embedding the PunchGuard core
//! in mobile shells and any host that can call C functions. Structured
//! results cross the boundary as JSON strings owned by this library.
//!
//! ## Usage
//!
//! ```c
//! #include "punchguard.h"
//!
//! int main() {
//!     // Initialize (NULL keeps the clock record in memory)
//!     PunchGuardHandle handle = punchguard_new("/data/app/punchguard");
//!     if (!handle) {
//!         return 1;
//!     }
//!
//!     // Process start: run the clock pass
//!     char* init = punchguard_start(handle, "boot-id", 7, 1);
//!     if (init) {
//!         // ... parse JSON verdict ...
//!         punchguard_string_free(init);
//!     }
//!
//!     // Score a fix delivered by the platform
//!     char* verdict = punchguard_evaluate(handle, sample_json);
//!     if (verdict) {
//!         punchguard_string_free(verdict);
//!     }
//!
//!     // Cleanup
//!     punchguard_free(handle);
//!     return 0;
//! }
//! ```

#![allow(clippy::missing_safety_doc)] // FFI functions are inherently unsafe

use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::path::PathBuf;
use std::ptr;
use std::sync::Arc;

use serde::Serialize;

use punchguard_core::config::GuardConfig;
use punchguard_core::monitor::{self, AntiCheatMonitor};
use punchguard_core::signals::HostSignals;
use punchguard_core::store::{FileStore, MemoryStore, StateStore};
use punchguard_core::types::LocationSample;

/// Opaque handle to the PunchGuard instance.
pub struct PunchGuardHandle {
    monitor: AntiCheatMonitor,
    signals: Arc<HostSignals>,
}

/// Error codes returned by FFI functions.
#[repr(C)]
pub enum PunchGuardError {
    /// Success.
    Success = 0,
    /// Invalid argument.
    InvalidArgument = -1,
    /// Serialization error.
    SerializationError = -4,
}

/// Borrow a C string as UTF-8, `None` on null or bad encoding.
unsafe fn cstr_arg<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok()
}

/// Serialize a value into a heap C string the caller frees with
/// `punchguard_string_free`. Null on serialization failure.
fn to_c_json<T: Serialize>(value: &T) -> *mut c_char {
    let json = match serde_json::to_string(value) {
        Ok(j) => j,
        Err(e) => {
            tracing::error!("Failed to serialize response: {}", e);
            return ptr::null_mut();
        },
    };
    match CString::new(json) {
        Ok(s) => s.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

unsafe fn parse_sample(json: *const c_char) -> Option<LocationSample> {
    let text = cstr_arg(json)?;
    match serde_json::from_str(text) {
        Ok(sample) => Some(sample),
        Err(e) => {
            tracing::error!("Failed to deserialize sample: {}", e);
            None
        },
    }
}

/// Initialize the PunchGuard module.
///
/// `storage_dir` names the directory for the persisted clock record;
/// pass NULL to keep the record in memory. Returns a handle that must
/// be passed to all other functions, or NULL on failure.
///
/// # Safety
///
/// The returned handle must be freed with `punchguard_free`.
#[no_mangle]
pub unsafe extern "C" fn punchguard_new(storage_dir: *const c_char) -> *mut PunchGuardHandle {
    // Initialize logging for the platform
    #[cfg(target_os = "android")]
    {
        android_logger::init_once(
            android_logger::Config::default()
                .with_max_level(log::LevelFilter::Info)
                .with_tag("PunchGuard"),
        );
    }

    let storage_dir = if storage_dir.is_null() {
        None
    } else {
        match cstr_arg(storage_dir) {
            Some(dir) => Some(PathBuf::from(dir)),
            None => return ptr::null_mut(),
        }
    };

    let config = GuardConfig {
        storage_dir: storage_dir.clone(),
        ..GuardConfig::default()
    };
    let signals = Arc::new(HostSignals::new());
    let store: Arc<dyn StateStore> = match storage_dir {
        Some(dir) => Arc::new(FileStore::new(dir)),
        None => Arc::new(MemoryStore::new()),
    };

    let monitor = AntiCheatMonitor::with_parts(config, signals.clone(), store);
    let handle = Box::new(PunchGuardHandle { monitor, signals });
    Box::into_raw(handle)
}

/// Run the process-start clock pass.
///
/// `boot_id` may be NULL when the host has no boot id; `boot_count`
/// below 1 means the signal is unavailable. Returns the init verdict as
/// JSON, or NULL on failure.
///
/// # Safety
///
/// `handle` must be a valid handle from `punchguard_new`.
#[no_mangle]
pub unsafe extern "C" fn punchguard_start(
    handle: *mut PunchGuardHandle,
    boot_id: *const c_char,
    boot_count: c_int,
    network_available: c_int,
) -> *mut c_char {
    if handle.is_null() {
        return ptr::null_mut();
    }
    let handle = &*handle;

    let boot_id = cstr_arg(boot_id).unwrap_or("");
    handle.signals.push_boot_count(boot_count);

    let verdict = handle
        .monitor
        .start_with_boot(boot_id, boot_count, network_available != 0);
    to_c_json(&verdict)
}

/// Push the host-resolved automatic time settings.
///
/// Pass -1 for a setting the host could not read.
///
/// # Safety
///
/// `handle` must be a valid handle from `punchguard_new`.
#[no_mangle]
pub unsafe extern "C" fn punchguard_push_settings(
    handle: *mut PunchGuardHandle,
    auto_time: c_int,
    auto_time_zone: c_int,
) -> c_int {
    if handle.is_null() {
        return PunchGuardError::InvalidArgument as c_int;
    }
    (*handle).signals.push_settings(auto_time, auto_time_zone);
    PunchGuardError::Success as c_int
}

/// Push the host-resolved boot count.
///
/// # Safety
///
/// `handle` must be a valid handle from `punchguard_new`.
#[no_mangle]
pub unsafe extern "C" fn punchguard_push_boot_count(
    handle: *mut PunchGuardHandle,
    boot_count: c_int,
) -> c_int {
    if handle.is_null() {
        return PunchGuardError::InvalidArgument as c_int;
    }
    (*handle).signals.push_boot_count(boot_count);
    PunchGuardError::Success as c_int
}

/// Push the host-resolved timezone id.
///
/// # Safety
///
/// `handle` must be a valid handle from `punchguard_new`.
/// `zone_id` must be a valid null-terminated string.
#[no_mangle]
pub unsafe extern "C" fn punchguard_push_time_zone(
    handle: *mut PunchGuardHandle,
    zone_id: *const c_char,
) -> c_int {
    if handle.is_null() {
        return PunchGuardError::InvalidArgument as c_int;
    }
    let zone_id = match cstr_arg(zone_id) {
        Some(z) => z,
        None => return PunchGuardError::InvalidArgument as c_int,
    };
    (*handle).signals.push_time_zone_id(zone_id);
    PunchGuardError::Success as c_int
}

/// Score a position fix.
///
/// `sample_json` is a JSON-encoded sample. Returns the verdict as JSON,
/// or NULL on bad input.
///
/// # Safety
///
/// `handle` must be a valid handle from `punchguard_new`.
/// `sample_json` must be a valid null-terminated string.
#[no_mangle]
pub unsafe extern "C" fn punchguard_evaluate(
    handle: *mut PunchGuardHandle,
    sample_json: *const c_char,
) -> *mut c_char {
    if handle.is_null() {
        return ptr::null_mut();
    }
    let sample = match parse_sample(sample_json) {
        Some(s) => s,
        None => return ptr::null_mut(),
    };

    let verdict = (*handle).monitor.on_location_update(&sample);
    to_c_json(&verdict)
}

/// Score a host-forced refresh.
///
/// # Safety
///
/// Same contract as `punchguard_evaluate`.
#[no_mangle]
pub unsafe extern "C" fn punchguard_evaluate_forced(
    handle: *mut PunchGuardHandle,
    sample_json: *const c_char,
) -> *mut c_char {
    if handle.is_null() {
        return ptr::null_mut();
    }
    let sample = match parse_sample(sample_json) {
        Some(s) => s,
        None => return ptr::null_mut(),
    };

    let verdict = (*handle).monitor.on_forced_update(&sample);
    to_c_json(&verdict)
}

/// Last evaluated position, retagged as served-from-cache.
///
/// The candidates are JSON-encoded samples the platform still holds;
/// either may be NULL. Returns NULL when no position is available.
///
/// # Safety
///
/// `handle` must be a valid handle from `punchguard_new`.
#[no_mangle]
pub unsafe extern "C" fn punchguard_last_known(
    handle: *mut PunchGuardHandle,
    gps_json: *const c_char,
    network_json: *const c_char,
) -> *mut c_char {
    if handle.is_null() {
        return ptr::null_mut();
    }
    let gps = parse_sample(gps_json);
    let network = parse_sample(network_json);

    match (*handle)
        .monitor
        .last_known_location(gps.as_ref(), network.as_ref())
    {
        Some(verdict) => to_c_json(&verdict),
        None => ptr::null_mut(),
    }
}

/// Apply an externally trusted time reading.
///
/// # Safety
///
/// `handle` must be a valid handle from `punchguard_new`.
/// `source` may be NULL.
#[no_mangle]
pub unsafe extern "C" fn punchguard_correct_time(
    handle: *mut PunchGuardHandle,
    network_time: i64,
    source: *const c_char,
) -> *mut c_char {
    if handle.is_null() {
        return ptr::null_mut();
    }
    let source = cstr_arg(source).unwrap_or("host");

    let verdict = (*handle).monitor.correct_with_network_time(network_time, source);
    to_c_json(&verdict)
}

/// Evaluate the clock state. Pure read.
///
/// # Safety
///
/// `handle` must be a valid handle from `punchguard_new`.
#[no_mangle]
pub unsafe extern "C" fn punchguard_check_cheating(handle: *mut PunchGuardHandle) -> *mut c_char {
    if handle.is_null() {
        return ptr::null_mut();
    }
    to_c_json(&(*handle).monitor.check_cheating())
}

/// Project the clock record plus live signals. Pure read.
///
/// # Safety
///
/// `handle` must be a valid handle from `punchguard_new`.
#[no_mangle]
pub unsafe extern "C" fn punchguard_telemetry(handle: *mut PunchGuardHandle) -> *mut c_char {
    if handle.is_null() {
        return ptr::null_mut();
    }
    to_c_json(&(*handle).monitor.telemetry())
}

/// Filesystem integrity scan plus the live mock flag.
///
/// # Safety
///
/// `handle` must be a valid handle from `punchguard_new`.
#[no_mangle]
pub unsafe extern "C" fn punchguard_security(handle: *mut PunchGuardHandle) -> *mut c_char {
    if handle.is_null() {
        return ptr::null_mut();
    }
    to_c_json(&(*handle).monitor.security_report())
}

/// Timezone identity for stamping punches.
///
/// # Safety
///
/// `handle` must be a valid handle from `punchguard_new`.
#[no_mangle]
pub unsafe extern "C" fn punchguard_timezone(handle: *mut PunchGuardHandle) -> *mut c_char {
    if handle.is_null() {
        return ptr::null_mut();
    }
    to_c_json(&(*handle).monitor.timezone_report())
}

/// Report a host-detected time anomaly into the structured log.
///
/// # Safety
///
/// `handle` must be a valid handle from `punchguard_new`.
/// `reason` and `detail` may be NULL.
#[no_mangle]
pub unsafe extern "C" fn punchguard_report_anomaly(
    handle: *mut PunchGuardHandle,
    reason: *const c_char,
    detail: *const c_char,
) -> c_int {
    if handle.is_null() {
        return PunchGuardError::InvalidArgument as c_int;
    }
    let reason = cstr_arg(reason).unwrap_or("unspecified");
    let detail = cstr_arg(detail).unwrap_or("");
    (*handle).monitor.report_time_anomaly(reason, detail);
    PunchGuardError::Success as c_int
}

/// Cheap null-island pre-filter; 1 when the coordinates are (0,0).
#[no_mangle]
pub extern "C" fn punchguard_mock_from_coords(latitude: f64, longitude: f64) -> c_int {
    c_int::from(monitor::mock_location_from_coords(latitude, longitude))
}

/// Whether location checks should run right now.
///
/// # Safety
///
/// `handle` must be a valid handle from `punchguard_new`.
#[no_mangle]
pub unsafe extern "C" fn punchguard_location_check_active(
    handle: *mut PunchGuardHandle,
) -> c_int {
    if handle.is_null() {
        return PunchGuardError::InvalidArgument as c_int;
    }
    c_int::from((*handle).monitor.location_check_active())
}

/// Remote kill switch.
///
/// # Safety
///
/// `handle` must be a valid handle from `punchguard_new`.
#[no_mangle]
pub unsafe extern "C" fn punchguard_set_location_check_enabled(
    handle: *mut PunchGuardHandle,
    enabled: c_int,
) -> c_int {
    if handle.is_null() {
        return PunchGuardError::InvalidArgument as c_int;
    }
    (*handle).monitor.set_location_check_enabled(enabled != 0);
    PunchGuardError::Success as c_int
}

/// Host-side bypass for allowlisted builds.
///
/// # Safety
///
/// `handle` must be a valid handle from `punchguard_new`.
#[no_mangle]
pub unsafe extern "C" fn punchguard_set_bypassed(
    handle: *mut PunchGuardHandle,
    bypassed: c_int,
) -> c_int {
    if handle.is_null() {
        return PunchGuardError::InvalidArgument as c_int;
    }
    (*handle).monitor.set_bypassed(bypassed != 0);
    PunchGuardError::Success as c_int
}

/// Mock-provider flag from the most recent scored sample.
///
/// # Safety
///
/// `handle` must be a valid handle from `punchguard_new`.
#[no_mangle]
pub unsafe extern "C" fn punchguard_mock_location_detected(
    handle: *mut PunchGuardHandle,
) -> c_int {
    if handle.is_null() {
        return PunchGuardError::InvalidArgument as c_int;
    }
    c_int::from((*handle).monitor.mock_location_detected())
}

/// Free a string returned by a PunchGuard function.
///
/// # Safety
///
/// `s` must be a pointer returned by a PunchGuard function, or NULL.
#[no_mangle]
pub unsafe extern "C" fn punchguard_string_free(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

/// Destroy the PunchGuard handle and release resources.
///
/// # Safety
///
/// `handle` must be a valid handle from `punchguard_new`.
/// After this call, the handle is invalid and must not be used.
#[no_mangle]
pub unsafe extern "C" fn punchguard_free(handle: *mut PunchGuardHandle) {
    if !handle.is_null() {
        drop(Box::from_raw(handle));
    }
}

/// Get the library version.
///
/// Returns a static string with the version number.
#[no_mangle]
pub extern "C" fn punchguard_version() -> *const c_char {
    concat!(env!("CARGO_PKG_VERSION"), "\0").as_ptr() as *const c_char
}

// Android JNI bindings
#[cfg(target_os = "android")]
mod android {
    use jni::objects::{JClass, JString};
    use jni::sys::{jint, jlong, jstring};
    use jni::JNIEnv;

    use super::*;

    fn jstring_arg(env: &mut JNIEnv, value: &JString) -> Option<String> {
        env.get_string(value).ok().map(Into::into)
    }

    fn jstring_result(env: &mut JNIEnv, ptr: *mut c_char) -> jstring {
        if ptr.is_null() {
            return std::ptr::null_mut();
        }
        let owned = unsafe { CString::from_raw(ptr) };
        match env.new_string(owned.to_string_lossy()) {
            Ok(s) => s.into_raw(),
            Err(_) => std::ptr::null_mut(),
        }
    }

    #[no_mangle]
    pub extern "system" fn Java_io_punchguard_PunchGuard_nativeInit(
        mut env: JNIEnv,
        _class: JClass,
        storage_dir: JString,
    ) -> jlong {
        let handle = match jstring_arg(&mut env, &storage_dir) {
            Some(dir) => {
                let c_dir = CString::new(dir).unwrap_or_default();
                unsafe { punchguard_new(c_dir.as_ptr()) }
            },
            None => unsafe { punchguard_new(std::ptr::null()) },
        };
        handle as jlong
    }

    #[no_mangle]
    pub extern "system" fn Java_io_punchguard_PunchGuard_nativeStart(
        mut env: JNIEnv,
        _class: JClass,
        handle: jlong,
        boot_id: JString,
        boot_count: jint,
        network_available: jint,
    ) -> jstring {
        let boot_id = jstring_arg(&mut env, &boot_id).unwrap_or_default();
        let c_boot_id = match CString::new(boot_id) {
            Ok(s) => s,
            Err(_) => return std::ptr::null_mut(),
        };
        let result = unsafe {
            punchguard_start(
                handle as *mut PunchGuardHandle,
                c_boot_id.as_ptr(),
                boot_count,
                network_available,
            )
        };
        jstring_result(&mut env, result)
    }

    #[no_mangle]
    pub extern "system" fn Java_io_punchguard_PunchGuard_nativeEvaluate(
        mut env: JNIEnv,
        _class: JClass,
        handle: jlong,
        sample_json: JString,
    ) -> jstring {
        let sample = match jstring_arg(&mut env, &sample_json) {
            Some(s) => s,
            None => return std::ptr::null_mut(),
        };
        let c_sample = match CString::new(sample) {
            Ok(s) => s,
            Err(_) => return std::ptr::null_mut(),
        };
        let result = unsafe {
            punchguard_evaluate(handle as *mut PunchGuardHandle, c_sample.as_ptr())
        };
        jstring_result(&mut env, result)
    }

    #[no_mangle]
    pub extern "system" fn Java_io_punchguard_PunchGuard_nativePushSettings(
        _env: JNIEnv,
        _class: JClass,
        handle: jlong,
        auto_time: jint,
        auto_time_zone: jint,
    ) -> jint {
        unsafe {
            punchguard_push_settings(handle as *mut PunchGuardHandle, auto_time, auto_time_zone)
        }
    }

    #[no_mangle]
    pub unsafe extern "system" fn Java_io_punchguard_PunchGuard_nativeDestroy(
        _env: JNIEnv,
        _class: JClass,
        handle: jlong,
    ) {
        punchguard_free(handle as *mut PunchGuardHandle);
    }

    // TODO: Bind check_cheating and telemetry once the host app consumes them
}
