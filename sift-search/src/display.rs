//! Presentation helpers. Nothing here feeds back into dispatch.

use rand::Rng;

/// `1234567` → `"1,234,567"`.
pub fn format_count(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Cosmetic elapsed time between 0.10 and 0.69 seconds.
pub fn elapsed_label<R: Rng + ?Sized>(rng: &mut R) -> String {
    let hundredths: u32 = rng.gen_range(10..70);
    format!("0.{hundredths}")
}

/// `About 1,234 results (0.42 seconds)`.
pub fn results_banner<R: Rng + ?Sized>(count: usize, rng: &mut R) -> String {
    format!(
        "About {} results ({} seconds)",
        format_count(count),
        elapsed_label(rng)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn counts_get_thousands_separators() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(1234567), "1,234,567");
    }

    #[test]
    fn banner_time_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let label = elapsed_label(&mut rng);
            let secs: f64 = label.parse().unwrap();
            assert!((0.10..0.70).contains(&secs), "{label}");
        }
        let banner = results_banner(5, &mut rng);
        assert!(banner.starts_with("About 5 results (0."));
        assert!(banner.ends_with(" seconds)"));
    }
}
