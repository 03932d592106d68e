//! Output file naming.

const OUTPUT_SUFFIX: &str = "_output";

/// Derives the output file name for a GET on `name`.
///
/// `_output` goes before the first `.` of the final path component, or at
/// the end when there is no dot: `report.txt` becomes `report_output.txt`,
/// `a.b.txt` becomes `a_output.b.txt`, `noext` becomes `noext_output`.
pub fn output_name(name: &str) -> String {
    let base_start = name.rfind('/').map_or(0, |slash| slash + 1);
    let split = name[base_start..]
        .find('.')
        .map_or(name.len(), |dot| base_start + dot);

    let (stem, extension) = name.split_at(split);
    format!("{stem}{OUTPUT_SUFFIX}{extension}")
}
