//! `#[repr(C)]` types for the export table.
//!
//! # Design
//! The host owns everything it passes in: the event, its strings and body,
//! and the database vtable. The library owns every `FfiHttpResponse` it
//! returns until the host hands it back to `todo_free_response`. Buffers the
//! host's database callbacks fill in are returned through its own
//! `free_buffer` callback, so each side frees with its own allocator.

use std::ffi::{c_void, CStr, CString};
use std::os::raw::c_char;

use todo_core::{HttpMethod, HttpRequest, HttpResponse};

// ---------------------------------------------------------------------------
// Event (host-provided, read-only)
// ---------------------------------------------------------------------------

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// One inbound request as the host dispatcher sees it.
///
/// `method` is the method name (`"GET"`, `"POST"`, ...). `path` may carry a
/// query component (`/api/todo?id=42`). `body` may be null when `body_len`
/// is 0.
#[repr(C)]
pub struct FfiHttpEvent {
    pub method: *const c_char,
    pub path: *const c_char,
    pub headers: *const FfiHeader,
    pub headers_len: u32,
    pub body: *const u8,
    pub body_len: usize,
}

impl FfiHttpEvent {
    /// Read the event into a core request. `None` if the method is unknown or
    /// a required string is null or not UTF-8.
    ///
    /// # Safety
    /// Every non-null pointer must be valid for the lengths given.
    pub(crate) unsafe fn to_core(&self) -> Option<HttpRequest> {
        let method: HttpMethod = read_str(self.method)?.parse().ok()?;
        let mut req = HttpRequest::new(method, read_str(self.path)?);

        if !self.headers.is_null() && self.headers_len > 0 {
            let headers = std::slice::from_raw_parts(self.headers, self.headers_len as usize);
            for h in headers {
                if let (Some(key), Some(value)) = (read_str(h.key), read_str(h.value)) {
                    req = req.with_header(key, value);
                }
            }
        }

        if !self.body.is_null() && self.body_len > 0 {
            req.body = std::slice::from_raw_parts(self.body, self.body_len).to_vec();
        }
        Some(req)
    }
}

/// Borrow a C string as UTF-8. `None` for null or invalid UTF-8.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string.
pub(crate) unsafe fn read_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok()
}

// ---------------------------------------------------------------------------
// Response (library-allocated)
// ---------------------------------------------------------------------------

/// An outbound response. Free with `todo_free_response`.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut u8,
    pub body_len: usize,
}

impl FfiHttpResponse {
    /// Move a core `HttpResponse` onto the heap as an `FfiHttpResponse`.
    /// Headers containing interior NULs are dropped.
    pub(crate) fn from_core(resp: HttpResponse) -> *mut Self {
        let ffi_headers: Box<[FfiHeader]> = resp
            .headers
            .into_iter()
            .filter_map(|(k, v)| {
                let key = CString::new(k).ok()?;
                let value = CString::new(v).ok()?;
                Some(FfiHeader {
                    key: key.into_raw(),
                    value: value.into_raw(),
                })
            })
            .collect();
        let headers_len = ffi_headers.len() as u32;
        let headers = if ffi_headers.is_empty() {
            std::ptr::null_mut()
        } else {
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        let body_len = resp.body.len();
        let body = if resp.body.is_empty() {
            std::ptr::null_mut()
        } else {
            Box::into_raw(resp.body.into_boxed_slice()) as *mut u8
        };

        Box::into_raw(Box::new(FfiHttpResponse {
            status: resp.status,
            headers,
            headers_len,
            body,
            body_len,
        }))
    }

    /// Release everything `from_core` allocated.
    ///
    /// # Safety
    /// `ptr` must come from `from_core` and not have been freed.
    pub(crate) unsafe fn free(ptr: *mut Self) {
        let resp = Box::from_raw(ptr);
        if !resp.headers.is_null() && resp.headers_len > 0 {
            let slice =
                std::ptr::slice_from_raw_parts_mut(resp.headers, resp.headers_len as usize);
            let headers = Box::from_raw(slice);
            for h in headers.iter() {
                if !h.key.is_null() {
                    drop(CString::from_raw(h.key));
                }
                if !h.value.is_null() {
                    drop(CString::from_raw(h.value));
                }
            }
        }
        if !resp.body.is_null() && resp.body_len > 0 {
            let slice = std::ptr::slice_from_raw_parts_mut(resp.body, resp.body_len);
            drop(Box::from_raw(slice));
        }
    }
}

// ---------------------------------------------------------------------------
// Database vtable (host-provided)
// ---------------------------------------------------------------------------

/// Result codes returned by the host's database callbacks. Callbacks return
/// the code as an `i32`; anything unrecognised counts as `Error`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiStatus {
    Ok = 0,
    NotFound = 1,
    Error = 2,
}

impl FfiStatus {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => FfiStatus::Ok,
            1 => FfiStatus::NotFound,
            _ => FfiStatus::Error,
        }
    }
}

/// A byte buffer filled in by a host callback and released with the
/// vtable's `free_buffer`.
#[repr(C)]
pub struct FfiBuffer {
    pub data: *mut u8,
    pub len: usize,
}

impl FfiBuffer {
    pub const fn empty() -> Self {
        Self {
            data: std::ptr::null_mut(),
            len: 0,
        }
    }
}

/// Writes a collection handle on success. A non-null handle written on
/// failure is passed to `close`.
pub type OpenFn = unsafe extern "C" fn(
    ctx: *mut c_void,
    name: *const c_char,
    handle: *mut *mut c_void,
    err: *mut FfiBuffer,
) -> i32;

pub type CloseFn = unsafe extern "C" fn(ctx: *mut c_void, handle: *mut c_void);

pub type PutFn = unsafe extern "C" fn(
    ctx: *mut c_void,
    handle: *mut c_void,
    key: *const c_char,
    value: *const u8,
    value_len: usize,
    err: *mut FfiBuffer,
) -> i32;

pub type GetFn = unsafe extern "C" fn(
    ctx: *mut c_void,
    handle: *mut c_void,
    key: *const c_char,
    out: *mut FfiBuffer,
    err: *mut FfiBuffer,
) -> i32;

pub type DeleteFn = unsafe extern "C" fn(
    ctx: *mut c_void,
    handle: *mut c_void,
    key: *const c_char,
    err: *mut FfiBuffer,
) -> i32;

/// Fills `out` with the matching keys, each terminated by a NUL byte.
pub type ListFn = unsafe extern "C" fn(
    ctx: *mut c_void,
    handle: *mut c_void,
    prefix: *const c_char,
    out: *mut FfiBuffer,
    err: *mut FfiBuffer,
) -> i32;

pub type FreeBufferFn = unsafe extern "C" fn(ctx: *mut c_void, buffer: FfiBuffer);

/// The host's database, as a context pointer plus callbacks. Every callback
/// must be non-null; a vtable with a missing callback is treated as an
/// unavailable database.
#[repr(C)]
pub struct FfiDatabase {
    pub ctx: *mut c_void,
    pub open: Option<OpenFn>,
    pub close: Option<CloseFn>,
    pub put: Option<PutFn>,
    pub get: Option<GetFn>,
    pub delete: Option<DeleteFn>,
    pub list: Option<ListFn>,
    pub free_buffer: Option<FreeBufferFn>,
}

impl FfiDatabase {
    pub(crate) fn is_complete(&self) -> bool {
        self.open.is_some()
            && self.close.is_some()
            && self.put.is_some()
            && self.get.is_some()
            && self.delete.is_some()
            && self.list.is_some()
            && self.free_buffer.is_some()
    }
}
