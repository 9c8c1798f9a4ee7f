//! String transfer between guest linear memory and host strings.
//!
//! Guest memory stays owned by the guest. The host only copies in or out for the duration of
//! one call; a descriptor never outlives that call unless the guest keeps the address itself.

use crate::abi::GuestExports;
use anyhow::Context;
use wasmtime::{AsContext, AsContextMut, Memory};

/// `{address, length}` of UTF-8 text inside guest memory.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct StringDescriptor {
    pub ptr: u32,
    pub len: u32,
}

/// Decode `len` bytes at `ptr` as UTF-8, replacing invalid sequences with U+FFFD.
///
/// An out-of-bounds range is an error; host imports turn it into a guest trap.
pub fn read_string(
    store: impl AsContext,
    memory: &Memory,
    ptr: u32,
    len: u32,
) -> anyhow::Result<String> {
    let start = ptr as usize;
    let bytes = start
        .checked_add(len as usize)
        .and_then(|end| memory.data(&store).get(start..end))
        .with_context(|| format!("string at {ptr:#x}+{len} is outside guest memory"))?;
    Ok(String::from_utf8_lossy(bytes).into_owned())
}

/// Copy `text` into a fresh guest allocation obtained from the exported `alloc`.
///
/// The guest must release the region with `dealloc(ptr, len)`.
pub fn write_string(
    mut store: impl AsContextMut,
    exports: &GuestExports,
    text: &str,
) -> anyhow::Result<StringDescriptor> {
    let bytes = text.as_bytes();
    let len = u32::try_from(bytes.len()).context("string does not fit in 32-bit guest memory")?;
    let ptr = exports.alloc.call(&mut store, len)?;
    exports
        .memory
        .write(&mut store, ptr as usize, bytes)
        .with_context(|| {
            format!("guest allocator returned {ptr:#x}, which cannot hold {len} bytes")
        })?;
    Ok(StringDescriptor { ptr, len })
}

/// Release a descriptor through the guest's exported `dealloc`.
pub fn free_string(
    store: impl AsContextMut,
    exports: &GuestExports,
    descriptor: StringDescriptor,
) -> anyhow::Result<()> {
    exports
        .dealloc
        .call(store, (descriptor.ptr, descriptor.len))?;
    Ok(())
}
