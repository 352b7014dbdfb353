//! Host memory page size, used to turn page counts into bytes.

use once_cell::sync::Lazy;

/// Page size assumed when the kernel cannot be asked.
pub const FALLBACK_PAGE_SIZE: u64 = 4096;

fn get_page_size() -> u64 {
    #[cfg(unix)]
    {
        // SAFETY: sysconf is safe to call with _SC_PAGESIZE
        // Returns -1 on error, handled by the > 0 check
        unsafe {
            let size = libc::sysconf(libc::_SC_PAGESIZE);
            if size > 0 {
                return size as u64;
            }
        }
    }
    FALLBACK_PAGE_SIZE
}

/// Page size in bytes, queried once per process.
pub static PAGE_SIZE: Lazy<u64> = Lazy::new(get_page_size);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size_is_power_of_two() {
        assert!(*PAGE_SIZE > 0);
        assert!(PAGE_SIZE.is_power_of_two());
    }
}
