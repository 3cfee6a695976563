use crate::{report::GenerationReport, resize::ResizeDirection};
const MAX_LISTED_WARNINGS: usize = 20;
pub fn print_summary(report: &GenerationReport) {
    println!("\n==== 문서 생성 요약 ====");
    println!("- 문서 종류: {}", report.kind);
    println!("- 아이템 수: {}", report.records);
    println!(
        "- 데이터 영역: {}행부터 (템플릿 {}행, 합계 표식 {}행)",
        report.region.data_start_row,
        report.region.template_row_count,
        report.region.totals_marker_row
    );
    let resize = match report.delta.direction {
        ResizeDirection::Insert => format!(
            "{}행 삽입 ({}행 위치)",
            report.delta.row_count, report.delta.anchor_row
        ),
        ResizeDirection::Delete => format!(
            "{}행 삭제 ({}행부터)",
            report.delta.row_count, report.delta.anchor_row
        ),
        ResizeDirection::None => "변경 없음".to_owned(),
    };
    println!("- 행 조정: {resize}");
    println!("- 엔진 호출: {}", report.round_trips);
    println!("- 출력: {}", report.output.display());
    if report.has_warnings() {
        println!("\n[경고 목록(상위 {MAX_LISTED_WARNINGS}개)]");
        for (i, warning) in report.warnings.iter().take(MAX_LISTED_WARNINGS).enumerate() {
            println!("  {}. {warning}", i + 1);
        }
        if report.warnings.len() > MAX_LISTED_WARNINGS {
            println!(
                "  ... ({}개 중 {MAX_LISTED_WARNINGS}개만 표시)",
                report.warnings.len()
            );
        }
    }
    println!("========================\n");
}
