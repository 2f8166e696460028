//! Tests for nested break implementations

use super::code::{get_variants, original};

/// Verify all variants produce the same results as the original
pub fn verify_all() -> Result<(), String> {
    for variant in get_variants() {
        if variant.name == "original" {
            continue;
        }

        for n1 in 0..10 {
            for n2 in 0..10 {
                let expected = original::find_with_flag(n1, n2);
                let actual = (variant.function)(n1, n2);

                if actual != expected {
                    return Err(format!(
                        "Variant '{}' failed for ({}, {}): expected {:?}, got {:?}",
                        variant.name, n1, n2, expected, actual
                    ));
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_variants() {
        verify_all().expect("All variants should produce correct results");
    }

    #[test]
    fn test_target_reached() {
        for variant in get_variants() {
            assert_eq!((variant.function)(3, 3), Some((2, 2)), "{}", variant.name);
            assert_eq!((variant.function)(9, 9), Some((2, 2)), "{}", variant.name);
        }
    }

    #[test]
    fn test_target_out_of_range() {
        for variant in get_variants() {
            assert_eq!((variant.function)(2, 9), None, "{}", variant.name);
            assert_eq!((variant.function)(9, 2), None, "{}", variant.name);
            assert_eq!((variant.function)(0, 0), None, "{}", variant.name);
        }
    }
}
