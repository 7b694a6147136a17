use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub mongodb_uri: String,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub offline_cache_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        let mongodb_uri = std::env::var("MONGODB_URI").expect("MONGODB_URI must be set");
        let gemini_api_key = std::env::var("GEMINI_API_KEY").expect("GEMINI_API_KEY must be set");
        let gemini_model =
            std::env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-1.5-flash".to_string());
        let offline_cache_path = std::env::var("OFFLINE_CACHE_PATH")
            .unwrap_or_else(|_| "offline_quizzes.db".to_string())
            .into();

        Config {
            mongodb_uri,
            gemini_api_key,
            gemini_model,
            offline_cache_path,
        }
    }
}
