use crate::sheet::address::{MAX_COLUMN, MAX_ROW, col_to_name, name_to_col};
fn rewrite_formula_rows(formula: &str, resolver: &dyn Fn(u32) -> u32) -> String {
    let chars: Vec<char> = formula.chars().collect();
    let mut i = 0usize;
    let mut out = String::with_capacity(formula.len());
    let mut in_string = false;
    let mut in_sheet_name = false;
    while let Some(&ch) = chars.get(i) {
        if ch == '"' && !in_sheet_name {
            out.push(ch);
            if in_string && chars.get(i + 1) == Some(&'"') {
                out.push('"');
                i += 2;
                continue;
            }
            in_string = !in_string;
            i += 1;
            continue;
        }
        if ch == '\'' && !in_string {
            in_sheet_name = !in_sheet_name;
            out.push(ch);
            i += 1;
            continue;
        }
        if in_string || in_sheet_name {
            out.push(ch);
            i += 1;
            continue;
        }
        if is_cell_ref_start(ch)
            && let Some((end_idx, replaced)) = try_rewrite_cell_ref(&chars, i, resolver)
        {
            out.push_str(&replaced);
            i = end_idx;
            continue;
        }
        out.push(ch);
        i += 1;
    }
    out
}
pub fn shift_formula_references(formula: &str, shift_by: i64, reference_start_row: u32) -> String {
    rewrite_formula_rows(formula, &|row| {
        if row < reference_start_row {
            return row;
        }
        let shifted = i64::from(row).saturating_add(shift_by).clamp(1, i64::from(MAX_ROW));
        u32::try_from(shifted).unwrap_or(row)
    })
}
pub fn sum_formula(col: u32, first_row: u32, last_row: u32) -> String {
    let name = col_to_name(col);
    format!("=SUM({name}{first_row}:{name}{last_row})")
}
pub fn expand_row_template(template: &str, row: u32) -> String {
    template.replace("{r}", &row.to_string())
}
pub fn is_sum_formula(text: &str) -> bool {
    text.trim_start().to_ascii_uppercase().contains("=SUM")
}
const fn is_cell_ref_start(ch: char) -> bool {
    ch == '$' || ch.is_ascii_alphabetic()
}
fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '.'
}
fn try_rewrite_cell_ref(
    chars: &[char],
    start: usize,
    resolver: &dyn Fn(u32) -> u32,
) -> Option<(usize, String)> {
    let prev = start.checked_sub(1).and_then(|idx| chars.get(idx)).copied();
    if prev.is_some_and(is_ident_char) {
        return None;
    }
    let mut i = start;
    let col_lock = chars.get(i) == Some(&'$');
    if col_lock {
        i += 1;
    }
    let col_start = i;
    while chars.get(i).is_some_and(char::is_ascii_alphabetic) {
        i += 1;
    }
    let col_text: String = chars.get(col_start..i)?.iter().collect();
    name_to_col(&col_text).filter(|c| *c <= MAX_COLUMN)?;
    let row_lock = chars.get(i) == Some(&'$');
    if row_lock {
        i += 1;
    }
    let row_start = i;
    while chars.get(i).is_some_and(char::is_ascii_digit) {
        i += 1;
    }
    let row_text: String = chars.get(row_start..i)?.iter().collect();
    if row_text.is_empty() {
        return None;
    }
    let next = chars.get(i).copied();
    if next.is_some_and(|ch| is_ident_char(ch) || ch == '(' || ch == '!') {
        return None;
    }
    let old_row = row_text.parse::<u32>().ok()?;
    let new_row = resolver(old_row);
    Some((
        i,
        format!(
            "{}{}{}{}",
            if col_lock { "$" } else { "" },
            col_text,
            if row_lock { "$" } else { "" },
            new_row
        ),
    ))
}
#[cfg(test)]
mod tests {
    use super::{is_sum_formula, shift_formula_references, sum_formula};
    use proptest::prelude::*;
    #[test]
    fn shifts_only_rows_at_or_after_threshold() {
        assert_eq!(
            shift_formula_references("=SUM(J13:J15)+J12", 2, 13),
            "=SUM(J15:J17)+J12"
        );
        assert_eq!(shift_formula_references("=J16*0.1", -2, 14), "=J14*0.1");
    }
    #[test]
    fn keeps_locks_strings_and_function_names() {
        assert_eq!(
            shift_formula_references("=$H$13*F13&\"A13\"", 1, 1),
            "=$H$14*F14&\"A13\""
        );
        assert_eq!(shift_formula_references("=LOG10(A13)", 5, 1), "=LOG10(A18)");
        assert_eq!(
            shift_formula_references("='Sheet 2'!B4+B4", 1, 1),
            "='Sheet 2'!B5+B5"
        );
    }
    #[test]
    fn unquoted_sheet_names_are_not_cell_references() {
        assert_eq!(shift_formula_references("=Tab1!A20+A20", 2, 1), "=Tab1!A22+A22");
        assert_eq!(
            shift_formula_references("=SUM(PO1!$J$13:J15)*Inv2!B4", -1, 14),
            "=SUM(PO1!$J$13:J14)*Inv2!B4"
        );
    }
    #[test]
    fn builds_and_recognizes_sum_formulas() {
        let f = sum_formula(10, 13, 17);
        assert_eq!(f, "=SUM(J13:J17)");
        assert!(is_sum_formula(&f));
        assert!(is_sum_formula("=sum(E13:E15)"));
        assert!(!is_sum_formula("Total"));
    }
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]
        #[test]
        fn shifting_back_and_forth_is_identity(row in 20u32..5_000, shift in 0i64..500) {
            let formula = format!("=SUM(A{row}:C{row})*$D${row}");
            let there = shift_formula_references(&formula, shift, 10);
            let shifted = u32::try_from(i64::from(row) + shift).unwrap();
            let back = shift_formula_references(&there, -shift, shifted.min(row).max(10));
            prop_assert_eq!(back, formula);
        }
    }
}
