//! Insertion sort. Quadratic, but branch-friendly on short or presorted input.

#[inline(never)]
pub fn insertion_sort(data: &mut [u32]) {
    for i in 1..data.len() {
        let value = data[i];
        let mut j = i;
        while j > 0 && data[j - 1] > value {
            data[j] = data[j - 1];
            j -= 1;
        }
        data[j] = value;
    }
}
