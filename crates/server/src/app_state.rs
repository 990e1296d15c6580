use content::ContentNormalizer;
use shared::protocol::ConfigurationFlags;

pub struct AppState {
    pub normalizer: ContentNormalizer,
    pub flags: ConfigurationFlags,
}
