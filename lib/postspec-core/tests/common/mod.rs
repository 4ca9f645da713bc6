use postspec_core::{Collection, Conversion, Converter};
use tracing::info;

pub const MEGAPORT_COLLECTION: &str = include_str!("../fixtures/megaport.postman_collection.json");

pub fn init_tracing() {
    // should be run once, fail otherwise, we skip that error
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();

    info!("Tracing initialized");
}

pub fn convert_fixture() -> anyhow::Result<Conversion> {
    init_tracing();
    let collection = Collection::from_json_str(MEGAPORT_COLLECTION)?;
    Ok(Converter::default().convert(&collection))
}
