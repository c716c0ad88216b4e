//! Decimal rounding of model outputs.

/// Round `value` to `decimals` places, ties to even.
///
/// The tie check runs on the shortest decimal representation of `value` (the
/// one `Display` prints), not on its exact binary expansion. `12.345` is a tie
/// and becomes `12.34` even though the nearest `f64` sits slightly above it.
/// Non-finite values are returned unchanged.
pub fn round_half_even(value: f64, decimals: usize) -> f64 {
    if !value.is_finite() {
        return value;
    }

    // Display never uses exponent notation for f64.
    let repr = value.abs().to_string();
    let (int_part, frac_part) = repr.split_once('.').unwrap_or((repr.as_str(), ""));
    if frac_part.len() <= decimals {
        return value;
    }

    let (kept, dropped) = frac_part.split_at(decimals);
    let mut digits: Vec<u8> = int_part.bytes().chain(kept.bytes()).map(|b| b - b'0').collect();

    let first_dropped = dropped.as_bytes()[0] - b'0';
    let rest_nonzero = dropped.bytes().skip(1).any(|b| b != b'0');
    let last_kept_odd = digits.last().is_some_and(|d| d % 2 == 1);
    let round_up = first_dropped > 5 || (first_dropped == 5 && (rest_nonzero || last_kept_odd));

    if round_up {
        increment(&mut digits);
    }

    let split = digits.len() - decimals;
    let render = |ds: &[u8]| ds.iter().map(|d| char::from(b'0' + d)).collect::<String>();
    let rounded = match decimals {
        0 => render(&digits),
        _ => format!("{}.{}", render(&digits[..split]), render(&digits[split..])),
    };

    // Shortest Display output always re-parses.
    let magnitude: f64 = rounded.parse().unwrap_or(value.abs());
    if magnitude == 0.0 {
        0.0
    } else {
        magnitude.copysign(value)
    }
}

fn increment(digits: &mut Vec<u8>) {
    for d in digits.iter_mut().rev() {
        if *d == 9 {
            *d = 0;
        } else {
            *d += 1;
            return;
        }
    }
    digits.insert(0, 1);
}

/// Two-decimal rounding applied to every prediction
pub fn round_prediction(value: f64) -> f64 {
    round_half_even(value, 2)
}
