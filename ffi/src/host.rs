//! `KeyValueStore` over the host's database vtable.

use std::ffi::{c_void, CString};
use std::ptr;

use todo_core::{Collection, KeyValueStore, StoreError};

use crate::types::{FfiBuffer, FfiDatabase, FfiStatus};

/// Borrowed view of a host database for the length of one call.
pub(crate) struct HostStore<'a> {
    db: &'a FfiDatabase,
}

impl<'a> HostStore<'a> {
    pub(crate) fn new(db: &'a FfiDatabase) -> Self {
        Self { db }
    }
}

impl<'a> KeyValueStore for HostStore<'a> {
    type Collection = HostCollection<'a>;

    fn open(&self, name: &str) -> Result<HostCollection<'a>, StoreError> {
        if !self.db.is_complete() {
            return Err(missing());
        }
        let open = self.db.open.ok_or_else(missing)?;
        let name = c_string(name)?;
        let mut handle: *mut c_void = ptr::null_mut();
        let mut err = FfiBuffer::empty();
        let code = unsafe { open(self.db.ctx, name.as_ptr(), &mut handle, &mut err) };
        match FfiStatus::from_code(code) {
            FfiStatus::Ok => Ok(HostCollection {
                db: self.db,
                handle,
            }),
            _ => {
                if !handle.is_null() {
                    if let Some(close) = self.db.close {
                        unsafe { close(self.db.ctx, handle) };
                    }
                }
                Err(StoreError::Unavailable(take_message(self.db, err)))
            }
        }
    }
}

/// An open collection; closed through the vtable when dropped.
pub(crate) struct HostCollection<'a> {
    db: &'a FfiDatabase,
    handle: *mut c_void,
}

impl HostCollection<'_> {
    fn check(&self, key: &str, code: i32, err: FfiBuffer) -> Result<(), StoreError> {
        let message = take_message(self.db, err);
        match FfiStatus::from_code(code) {
            FfiStatus::Ok => Ok(()),
            FfiStatus::NotFound => Err(StoreError::NotFound {
                key: key.to_string(),
            }),
            FfiStatus::Error => Err(StoreError::Backend(message)),
        }
    }

    fn take(&self, buffer: FfiBuffer) -> Vec<u8> {
        take_bytes(self.db, buffer)
    }
}

impl Collection for HostCollection<'_> {
    fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let put = self.db.put.ok_or_else(missing)?;
        let c_key = c_string(key)?;
        let mut err = FfiBuffer::empty();
        let code = unsafe {
            put(
                self.db.ctx,
                self.handle,
                c_key.as_ptr(),
                value.as_ptr(),
                value.len(),
                &mut err,
            )
        };
        self.check(key, code, err)
    }

    fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        let get = self.db.get.ok_or_else(missing)?;
        let c_key = c_string(key)?;
        let mut out = FfiBuffer::empty();
        let mut err = FfiBuffer::empty();
        let code = unsafe { get(self.db.ctx, self.handle, c_key.as_ptr(), &mut out, &mut err) };
        let value = self.take(out);
        self.check(key, code, err)?;
        Ok(value)
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let delete = self.db.delete.ok_or_else(missing)?;
        let c_key = c_string(key)?;
        let mut err = FfiBuffer::empty();
        let code = unsafe { delete(self.db.ctx, self.handle, c_key.as_ptr(), &mut err) };
        self.check(key, code, err)
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let list = self.db.list.ok_or_else(missing)?;
        let c_prefix = c_string(prefix)?;
        let mut out = FfiBuffer::empty();
        let mut err = FfiBuffer::empty();
        let code =
            unsafe { list(self.db.ctx, self.handle, c_prefix.as_ptr(), &mut out, &mut err) };
        let raw = self.take(out);
        self.check(prefix, code, err)?;
        Ok(raw
            .split(|b| *b == 0)
            .filter(|key| !key.is_empty())
            .map(|key| String::from_utf8_lossy(key).into_owned())
            .collect())
    }
}

impl Drop for HostCollection<'_> {
    fn drop(&mut self) {
        if let Some(close) = self.db.close {
            unsafe { close(self.db.ctx, self.handle) };
        }
    }
}

fn missing() -> StoreError {
    StoreError::Unavailable("host database vtable is incomplete".to_string())
}

fn c_string(s: &str) -> Result<CString, StoreError> {
    CString::new(s).map_err(|_| StoreError::Backend(format!("key contains a NUL byte: {s:?}")))
}

/// Copy a host buffer and hand it back to the host.
fn take_bytes(db: &FfiDatabase, buffer: FfiBuffer) -> Vec<u8> {
    if buffer.data.is_null() {
        return Vec::new();
    }
    let bytes = unsafe { std::slice::from_raw_parts(buffer.data, buffer.len) }.to_vec();
    if let Some(free) = db.free_buffer {
        unsafe { free(db.ctx, buffer) };
    }
    bytes
}

fn take_message(db: &FfiDatabase, err: FfiBuffer) -> String {
    let bytes = take_bytes(db, err);
    if bytes.is_empty() {
        "host database error".to_string()
    } else {
        String::from_utf8_lossy(&bytes).into_owned()
    }
}
