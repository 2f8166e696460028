//! Tests for small sort implementations

use super::code::{get_variants, original};
use super::{generate_input, InputOrder};

/// Verify all variants produce the same results as the original
pub fn verify_all() -> Result<(), String> {
    let orders = [InputOrder::Random, InputOrder::Sorted, InputOrder::Reversed];

    for variant in get_variants() {
        if variant.name == "stable" {
            continue;
        }

        for len in [0, 1, 2, 7, 16, 64, 257] {
            for order in orders {
                let mut expected = generate_input(len, order);
                original::sort_stable(&mut expected);
                let mut actual = generate_input(len, order);
                (variant.function)(&mut actual);

                if actual != expected {
                    return Err(format!(
                        "Variant '{}' failed for len {} ({}): output differs from reference",
                        variant.name,
                        len,
                        order.as_str()
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
    fn test_duplicates() {
        for variant in get_variants() {
            let mut data = vec![3, 1, 3, 0, 1, 3];
            (variant.function)(&mut data);
            assert_eq!(data, vec![0, 1, 1, 3, 3, 3], "{}", variant.name);
        }
    }

    #[test]
    fn test_generate_input_orders() {
        let random = generate_input(64, InputOrder::Random);
        assert_eq!(random, generate_input(64, InputOrder::Random));

        let sorted = generate_input(64, InputOrder::Sorted);
        assert!(sorted.windows(2).all(|w| w[0] <= w[1]));

        let reversed = generate_input(64, InputOrder::Reversed);
        assert!(reversed.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(reversed.len(), 64);
    }

    #[test]
    fn test_parse_order() {
        assert_eq!("sorted".parse::<InputOrder>(), Ok(InputOrder::Sorted));
        assert!("sideways".parse::<InputOrder>().is_err());
    }
}
