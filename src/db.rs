use mongodb::{Client, Database};

use crate::error::Error;

pub async fn init_db(uri: &str) -> Result<Database, Error> {
    let client = Client::with_uri_str(uri).await?;
    Ok(client.database("gtc_prep"))
}
