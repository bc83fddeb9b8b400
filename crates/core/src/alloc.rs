//! Tree-sitter allocator override for `wasm32` targets.
//!
//! `wasm32-unknown-unknown` builds of tree-sitter link a minimal libc shim whose `malloc`/`free`
//! corrupt memory once trees are freed from JS. On that target the parsers allocate through
//! Rust's global allocator instead. Elsewhere this is a no-op.

#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_tree_sitter_allocator() {}

#[cfg(target_arch = "wasm32")]
pub fn ensure_tree_sitter_allocator() {
    use std::sync::Once;

    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        // SAFETY: runs once, before any parser is created on this thread.
        unsafe {
            tree_sitter::set_allocator(
                Some(shim::malloc),
                Some(shim::calloc),
                Some(shim::realloc),
                Some(shim::free),
            );
        }
    });
}

/// C allocation functions backed by `std::alloc`. Each block carries its size in a header so
/// `free` can rebuild the layout.
#[cfg(target_arch = "wasm32")]
mod shim {
    use core::ffi::c_void;
    use core::ptr;
    use std::alloc::{Layout, alloc, dealloc};

    const ALIGN: usize = 16;
    const HEADER: usize = ALIGN;

    fn layout_for(size: usize) -> Option<Layout> {
        let total = size.checked_add(HEADER)?;
        Layout::from_size_align(total, ALIGN).ok()
    }

    /// Returns the block base and the user size stored in its header.
    unsafe fn header(user: *mut c_void) -> (*mut u8, usize) {
        let base = unsafe { (user as *mut u8).sub(HEADER) };
        let size = unsafe { (base as *const usize).read() };
        (base, size)
    }

    pub unsafe extern "C" fn malloc(size: usize) -> *mut c_void {
        if size == 0 {
            return ptr::null_mut();
        }
        let Some(layout) = layout_for(size) else {
            return ptr::null_mut();
        };

        // SAFETY: `layout` has a non-zero size.
        let base = unsafe { alloc(layout) };
        if base.is_null() {
            return ptr::null_mut();
        }
        unsafe {
            (base as *mut usize).write(size);
            base.add(HEADER) as *mut c_void
        }
    }

    pub unsafe extern "C" fn calloc(count: usize, size: usize) -> *mut c_void {
        let Some(total) = count.checked_mul(size) else {
            return ptr::null_mut();
        };
        let user = unsafe { malloc(total) };
        if !user.is_null() {
            unsafe { ptr::write_bytes(user as *mut u8, 0, total) };
        }
        user
    }

    pub unsafe extern "C" fn free(user: *mut c_void) {
        if user.is_null() {
            return;
        }
        let (base, size) = unsafe { header(user) };
        if let Some(layout) = layout_for(size) {
            unsafe { dealloc(base, layout) };
        }
    }

    pub unsafe extern "C" fn realloc(user: *mut c_void, new_size: usize) -> *mut c_void {
        if user.is_null() {
            return unsafe { malloc(new_size) };
        }
        if new_size == 0 {
            unsafe { free(user) };
            return ptr::null_mut();
        }

        let (_, old_size) = unsafe { header(user) };
        let moved = unsafe { malloc(new_size) };
        if moved.is_null() {
            return ptr::null_mut();
        }
        unsafe {
            ptr::copy_nonoverlapping(user as *const u8, moved as *mut u8, old_size.min(new_size));
            free(user);
        }
        moved
    }
}
