use anyhow::Result;
use geotable_core::progress::get_progress_bar;
use geotable_geojson::{MemoryTable, read_geojson_file};
use std::path::PathBuf;

#[derive(clap::Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// GeoJSON file you want to probe
	/// supported formats are: *.geojson, *.json and their .gz variants
	#[arg(required = true, verbatim_doc_comment)]
	input_file: PathBuf,
}

pub fn run(arguments: &Subcommand) -> Result<()> {
	eprintln!("probe {:?}", arguments.input_file);

	let mut table = MemoryTable::new();
	let progress = get_progress_bar();
	let report = read_geojson_file(&arguments.input_file, &mut table, progress.as_ref())?;

	println!("schema:   {}", table.table_schema());
	println!("geometry: {}", report.geometry_type);
	println!("srid:     {}", report.srid);
	println!("features: {}", report.feature_count);

	Ok(())
}
