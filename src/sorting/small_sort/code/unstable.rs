#[inline(never)]
pub fn sort_unstable(data: &mut [u32]) {
    data.sort_unstable();
}
