//! Human-readable byte sizes for the accepted-file list.

const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
const STEP: u128 = 1024;

/// Format a byte count with the largest unit keeping the value under 1024.
///
/// The value is rounded half-up to two decimals and trailing zeros are
/// dropped, so `1536` is `"1.5 KB"`. Units stop at GB. All arithmetic is
/// integral to keep results exact at unit boundaries.
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut index = 0;
    let mut scaled = bytes;
    while scaled >= 1024 && index < UNITS.len() - 1 {
        scaled /= 1024;
        index += 1;
    }

    let divisor = STEP.pow(index as u32);
    let numerator = bytes as u128 * 100;
    let mut hundredths = numerator / divisor;
    if (numerator % divisor) * 2 >= divisor {
        hundredths += 1;
    }

    let whole = hundredths / 100;
    let frac = hundredths % 100;
    let value = if frac == 0 {
        whole.to_string()
    } else if frac % 10 == 0 {
        format!("{}.{}", whole, frac / 10)
    } else {
        format!("{}.{:02}", whole, frac)
    };

    format!("{} {}", value, UNITS[index])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_values() {
        assert_eq!(format_size(0), "0 Bytes");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(1_073_741_824), "1 GB");
    }

    #[test]
    fn test_unit_boundaries() {
        assert_eq!(format_size(1), "1 Bytes");
        assert_eq!(format_size(1023), "1023 Bytes");
        assert_eq!(format_size(1024), "1 KB");
        assert_eq!(format_size(1024 * 1024), "1 MB");
        assert_eq!(format_size(52_428_800), "50 MB");
    }

    #[test]
    fn test_two_decimal_rounding() {
        // 1.125 KB rounds half-up
        assert_eq!(format_size(1152), "1.13 KB");
        // 1.0009765625 KB
        assert_eq!(format_size(1025), "1 KB");
        // 1.05078125 KB
        assert_eq!(format_size(1076), "1.05 KB");
        // Just below the next unit rounds up to 1024 of the smaller unit
        assert_eq!(format_size(1024 * 1024 - 1), "1024 KB");
    }

    #[test]
    fn test_clamped_to_gigabytes() {
        assert_eq!(format_size(1024u64.pow(4)), "1024 GB");
        assert_eq!(format_size(u64::MAX), "17179869184 GB");
    }

    #[test]
    fn test_unit_index_is_floor_log_1024() {
        for exp in 0..4u32 {
            let low = 1024u64.pow(exp);
            let high = 1024u64.pow(exp + 1) - 1024u64.pow(exp) / 2 - 1;
            assert!(format_size(low).ends_with(UNITS[exp as usize]), "{}", low);
            assert!(format_size(high).ends_with(UNITS[exp as usize]), "{}", high);
        }
    }
}
