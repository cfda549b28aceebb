use k8s_openapi::apimachinery::pkg::api::resource::Quantity;

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Parses a Kubernetes quantity string ("250m", "2", "512Mi", "1.5G", "1e3")
/// into its base unit. Returns `None` for anything that does not parse.
pub fn parse_quantity(quantity: &str) -> Option<f64> {
    let quantity = quantity.trim();
    if quantity.is_empty() {
        return None;
    }

    if let Ok(value) = quantity.parse::<f64>() {
        return Some(value);
    }

    // Binary suffixes first so "Mi" is not read as "M" followed by junk
    const BINARY: &[(&str, f64)] = &[
        ("Ki", 1024.0),
        ("Mi", 1024.0 * 1024.0),
        ("Gi", GIB),
        ("Ti", GIB * 1024.0),
        ("Pi", GIB * 1024.0 * 1024.0),
        ("Ei", GIB * 1024.0 * 1024.0 * 1024.0),
    ];
    for (suffix, factor) in BINARY {
        if let Some(value) = quantity.strip_suffix(suffix) {
            return value.parse::<f64>().ok().map(|v| v * factor);
        }
    }

    const DECIMAL: &[(char, i32)] = &[
        ('n', -9),
        ('u', -6),
        ('m', -3),
        ('k', 3),
        ('M', 6),
        ('G', 9),
        ('T', 12),
        ('P', 15),
        ('E', 18),
    ];
    for (suffix, exponent) in DECIMAL {
        if let Some(value) = quantity.strip_suffix(*suffix) {
            let scale = 10f64.powi(exponent.abs());
            return value
                .parse::<f64>()
                .ok()
                .map(|v| if *exponent < 0 { v / scale } else { v * scale });
        }
    }

    None
}

/// CPU quantity in fractional cores ("250m" -> 0.25).
pub fn cpu_cores(cpu: &Quantity) -> f64 {
    parse_quantity(&cpu.0).unwrap_or(0.0)
}

/// Memory quantity in GiB (bytes / 2^30).
pub fn memory_gib(memory: &Quantity) -> f64 {
    parse_quantity(&memory.0).unwrap_or(0.0) / GIB
}
