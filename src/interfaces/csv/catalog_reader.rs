use crate::domain::product::NewProduct;
use crate::error::EngineError;
use std::io::Read;

impl From<csv::Error> for EngineError {
    fn from(err: csv::Error) -> Self {
        EngineError::Validation(format!("catalog CSV: {err}"))
    }
}

/// Reads a product catalog from CSV with columns
/// `name, description, price, stock`.
pub struct CatalogReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CatalogReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    pub fn products(self) -> impl Iterator<Item = Result<NewProduct, EngineError>> {
        self.reader
            .into_deserialize()
            .map(|row| row.map_err(EngineError::from))
    }
}
