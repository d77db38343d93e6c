//! Image perception agent: decode, extract metadata, request a vision-model
//! deepfake/manipulation verdict. The decode-then-describe shape follows
//! `bioforge-vision`'s `image`-crate usage in the retrieval pack (no
//! teacher crate touches raw image bytes, so this is grounded there rather
//! than in `Senaraufi-Security-Log-Analyser`) while the prompt/parse
//! posture mirrors `analyzer-llm/src/analyzer.rs`'s JSON-schema-in-prompt
//! style.

use image::{ColorType, DynamicImage, ImageFormat};
use threat_common::{DeepfakeAnalysis, ImageAnalysisResult, ImageMetadata, ThreatError};
use threat_llm_client::{extract_json, LlmClient};

pub struct ImageAnalyzer<'a> {
    llm: &'a dyn LlmClient,
}

impl<'a> ImageAnalyzer<'a> {
    pub fn new(llm: &'a dyn LlmClient) -> Self {
        Self { llm }
    }

    /// Runs spec.md §4.3: decode, metadata, optional QR (never available in
    /// this corpus — see SPEC_FULL.md §4.3), vision prompt, parse.
    pub async fn analyze(&self, bytes: &[u8], context: &str) -> Result<ImageAnalysisResult, ThreatError> {
        let format = image::guess_format(bytes).ok();
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| ThreatError::UnsupportedMedia(e.to_string()))?;

        let metadata = build_metadata(&decoded, format);
        let qr_payloads = None;

        let prompt = vision_prompt(context);
        let response = self.llm.analyze_image(bytes, &prompt).await;

        let result = match response {
            Ok(response) => parse_verdict(&response.text, metadata, qr_payloads),
            Err(_) => ImageAnalysisResult {
                metadata,
                qr_payloads,
                ..ImageAnalysisResult::neutral()
            },
        };

        Ok(result)
    }
}

fn build_metadata(image: &DynamicImage, format: Option<ImageFormat>) -> ImageMetadata {
    let (width, height) = (image.width(), image.height());
    ImageMetadata {
        format: format.map(format_name).unwrap_or_else(|| "unknown".to_string()),
        size: [width, height],
        mode: color_mode_name(image.color()).to_string(),
    }
}

fn format_name(format: ImageFormat) -> String {
    match format {
        ImageFormat::Jpeg => "JPEG",
        ImageFormat::Png => "PNG",
        ImageFormat::Gif => "GIF",
        ImageFormat::WebP => "WEBP",
        ImageFormat::Bmp => "BMP",
        ImageFormat::Tiff => "TIFF",
        _ => "unknown",
    }
    .to_string()
}

fn color_mode_name(color: ColorType) -> &'static str {
    match color {
        ColorType::L8 | ColorType::L16 => "L",
        ColorType::La8 | ColorType::La16 => "LA",
        ColorType::Rgb8 | ColorType::Rgb16 | ColorType::Rgb32F => "RGB",
        ColorType::Rgba8 | ColorType::Rgba16 | ColorType::Rgba32F => "RGBA",
        _ => "unknown",
    }
}

fn vision_prompt(context: &str) -> String {
    format!(
        "You are a security analyst examining an image submitted as: {context}. \
         Assess it for deepfake/manipulation indicators. Respond with a single \
         fenced JSON code block matching this schema:\n\
         ```json\n{{\"visual_threat_score\": <0-100>, \"deepfake_probability\": <0-1>, \
         \"manipulation_indicators\": [<string>], \"authenticity_assessment\": <string>, \
         \"confidence\": <0-1>, \"evidence\": [<object>], \"reasoning\": <string>}}\n```"
    )
}

fn parse_verdict(text: &str, metadata: ImageMetadata, qr_payloads: Option<Vec<String>>) -> ImageAnalysisResult {
    let value = extract_json(text);
    let is_empty = value.as_object().map(|o| o.is_empty()).unwrap_or(true);
    if is_empty {
        return ImageAnalysisResult {
            metadata,
            qr_payloads,
            ..ImageAnalysisResult::neutral()
        };
    }

    let visual_threat_score = value.get("visual_threat_score").and_then(|v| v.as_f64()).unwrap_or(0.0) as f32;
    let probability = value.get("deepfake_probability").and_then(|v| v.as_f64()).unwrap_or(0.0) as f32;
    let authenticity = value
        .get("authenticity_assessment")
        .and_then(|v| v.as_str())
        .unwrap_or("unknown")
        .to_string();
    let indicators = value
        .get("manipulation_indicators")
        .and_then(|v| v.as_array())
        .map(|arr| arr.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
        .unwrap_or_default();
    let confidence = value.get("confidence").and_then(|v| v.as_f64()).unwrap_or(0.0) as f32;

    ImageAnalysisResult {
        visual_threat_score,
        deepfake_analysis: DeepfakeAnalysis {
            probability,
            authenticity,
            indicators,
        },
        metadata,
        qr_payloads,
        confidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use threat_llm_client::{CachedClient, MockTransport};

    fn sample_jpeg() -> Vec<u8> {
        let image = image::RgbImage::from_pixel(60, 30, image::Rgb([255, 0, 0]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgb8(image)
            .write_to(&mut std::io::Cursor::new(&mut bytes), ImageFormat::Jpeg)
            .unwrap();
        bytes
    }

    fn client_with_response(response: &str) -> CachedClient<MockTransport> {
        let transport = MockTransport::new();
        transport.set_response("", response);
        CachedClient::new(transport, 16)
    }

    #[tokio::test]
    async fn deepfake_verdict_is_parsed_from_vision_response() {
        let client = client_with_response(
            r#"{"visual_threat_score": 85, "deepfake_probability": 0.9,
                "manipulation_indicators": ["unnatural_skin"],
                "authenticity_assessment": "likely_fake", "confidence": 0.95}"#,
        );
        let analyzer = ImageAnalyzer::new(&client);

        let result = analyzer.analyze(&sample_jpeg(), "profile_picture").await.unwrap();

        assert_eq!(result.visual_threat_score, 85.0);
        assert_eq!(result.deepfake_analysis.probability, 0.9);
        assert_eq!(result.deepfake_analysis.authenticity, "likely_fake");
        assert_eq!(result.metadata.format, "JPEG");
    }

    #[tokio::test]
    async fn metadata_extraction_reports_size_and_mode() {
        let client = client_with_response("{}");
        let analyzer = ImageAnalyzer::new(&client);

        let result = analyzer.analyze(&sample_jpeg(), "profile_picture").await.unwrap();

        assert_eq!(result.metadata.size, [60, 30]);
        assert_eq!(result.metadata.mode, "RGB");
        assert_eq!(result.confidence, 0.0);
    }

    #[tokio::test]
    async fn undecodable_bytes_are_unsupported_media() {
        let client = client_with_response("{}");
        let analyzer = ImageAnalyzer::new(&client);

        let result = analyzer.analyze(b"not an image", "x").await;
        assert!(matches!(result, Err(ThreatError::UnsupportedMedia(_))));
    }
}
