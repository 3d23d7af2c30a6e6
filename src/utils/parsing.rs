/// Parse de algo como: [1, 3, 224, 224]
pub fn parse_usize_list(text: &str) -> Result<Vec<usize>, String> {
    let inner = text.trim();
    if !inner.starts_with('[') || !inner.ends_with(']') {
        return Err(format!("Expected [d1, d2, ...], got: {}", text));
    }
    let inner = &inner[1..inner.len() - 1]; // sin [ ]
    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }
    let mut out = Vec::new();
    for part in inner.split(',') {
        let p = part.trim();
        let n: usize = p.parse().map_err(|_| format!("Invalid dimension: {}", p))?;
        out.push(n);
    }
    Ok(out)
}

/// Dims as given on the command line: `[2, 3]`, `2,3` or `2x3`.
pub fn parse_dims(text: &str) -> Result<Vec<usize>, String> {
    let t = text.trim();
    if t.starts_with('[') {
        return parse_usize_list(t);
    }
    let sep = if t.contains('x') { 'x' } else { ',' };
    t.split(sep)
        .map(|p| {
            let p = p.trim();
            p.parse::<usize>()
                .map_err(|_| format!("Invalid dimension: {}", p))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bracketed_list() {
        assert_eq!(parse_usize_list("[1, 3, 224, 224]").unwrap(), vec![1, 3, 224, 224]);
        assert_eq!(parse_usize_list("[]").unwrap(), Vec::<usize>::new());
        assert!(parse_usize_list("1, 2").is_err());
        assert!(parse_usize_list("[1, a]").is_err());
    }

    #[test]
    fn test_cli_dims() {
        assert_eq!(parse_dims("2x3x4").unwrap(), vec![2, 3, 4]);
        assert_eq!(parse_dims("2, 3").unwrap(), vec![2, 3]);
        assert_eq!(parse_dims("[8]").unwrap(), vec![8]);
        assert!(parse_dims("2x-1").is_err());
    }
}
