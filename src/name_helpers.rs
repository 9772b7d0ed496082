//! Name-case helpers used by emitters to turn `.packet` identifiers into
//! idiomatic target-language identifiers.

/// Convert `camelCase` or `PascalCase` into `snake_case`.
pub fn to_snake_case(name: &str) -> String {
    let mut buffer = String::new();
    for c in name.chars() {
        if c.is_uppercase() && !buffer.is_empty() {
            buffer.push('_');
        }
        buffer.push(c.to_ascii_lowercase());
    }
    buffer
}

/// Convert `snake_case` or `camelCase` into `PascalCase`.
pub fn to_pascal_case(name: &str) -> String {
    let mut buffer = String::new();
    let mut capitalize_next = true;
    for c in name.chars() {
        match c {
            '_' | '-' | ' ' => capitalize_next = true,
            _ if capitalize_next => {
                buffer.extend(c.to_uppercase());
                capitalize_next = false;
            }
            _ => buffer.push(c),
        }
    }
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snake_case_inserts_underscore_at_case_boundary() {
        assert_eq!(to_snake_case("satellitePrn"), "satellite_prn");
        assert_eq!(to_snake_case("X"), "x");
    }

    #[test]
    fn pascal_case_from_snake() {
        assert_eq!(to_pascal_case("satellite_prn"), "SatellitePrn");
        assert_eq!(to_pascal_case("x"), "X");
    }
}
