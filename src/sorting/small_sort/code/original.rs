//! Reference implementation: the standard library stable sort.

#[inline(never)]
pub fn sort_stable(data: &mut [u32]) {
    data.sort();
}
