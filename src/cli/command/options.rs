use chirps::registry;

/// Table of the datasets that can be downloaded.
pub fn options() -> String {
    let mut table = format!(
        "{:<20} {:<10} {:<40} {}\n",
        "dataset", "frequency", "label", "subdir"
    );

    for d in registry::list_all() {
        table.push_str(&format!(
            "{:<20} {:<10} {:<40} {}\n",
            d.code,
            d.frequency.to_string(),
            d.label,
            d.remote_subdir
        ));
    }

    table
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn should_list_every_dataset() {
        let table = options();
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("dataset"));
        assert!(lines[2].starts_with("africa_monthly"));
        assert!(lines[2].contains("Africa (Monthly)"));
        assert!(lines[2].ends_with("africa_monthly/tifs"));
    }
}
