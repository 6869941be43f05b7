use std::path::Path;

use crate::config::{BannerConfig, EditorConfig, PaddingConfig};
use crate::tool::ToolCommand;

/// `pad` filter growing the frame by `margin` on every side
pub fn padding_filter(padding: &PaddingConfig) -> String {
    format!(
        "pad=iw+{total}:ih+{total}:{margin}:{margin}:{color}",
        total = padding.margin * 2,
        margin = padding.margin,
        color = padding.color,
    )
}

/// `drawtext` filter centering the banner near the bottom edge
pub fn banner_filter(banner: &BannerConfig) -> String {
    format!(
        "drawtext=fontfile={font}:text={text}:fontsize={size}:fontcolor={color}:\
         x=(main_w-text_w)/2:y=main_h-{offset}:box=1:\
         boxcolor={box_color}@{opacity}:boxborderw={border}",
        font = escape_filter_value(&banner.font_file),
        text = escape_filter_value(&banner.text),
        size = banner.font_size,
        color = banner.font_color,
        offset = banner.bottom_offset,
        box_color = banner.box_color,
        opacity = banner.box_opacity.clamp(0.0, 1.0),
        border = banner.box_border,
    )
}

/// Full filter chain: padding first, banner drawn on the padded frame
pub fn filter_chain(config: &EditorConfig) -> String {
    format!("{},{}", padding_filter(&config.padding), banner_filter(&config.banner))
}

/// Escape a free-form option value for use inside a `-vf` filtergraph
///
/// Two levels apply: the filter option parser treats `\ ' :` as special,
/// then the graph parser treats `\ ' [ ] , ;` as special.
pub fn escape_filter_value(value: &str) -> String {
    escape_chars(&escape_chars(value, &['\\', '\'', ':']), &['\\', '\'', '[', ']', ',', ';'])
}

fn escape_chars(value: &str, special: &[char]) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if special.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Builder for ffmpeg invocations
pub struct EncodeCommandBuilder {
    binary_path: String,
}

impl EncodeCommandBuilder {
    pub fn new<S: Into<String>>(binary_path: S) -> Self {
        Self {
            binary_path: binary_path.into(),
        }
    }

    /// Build the padding + banner + re-encode command
    pub fn transform<P: AsRef<Path>>(&self, source: P, destination: P, config: &EditorConfig) -> ToolCommand {
        let settings = config.profile.settings();

        let mut cmd = ToolCommand::new(&self.binary_path, "Video transform")
            .arg("-y")
            .arg("-i")
            .path(source)
            .option("-vf", filter_chain(config))
            .option("-c:v", settings.video_codec)
            .option("-b:v", settings.video_bitrate)
            .option("-c:a", settings.audio_codec)
            .option("-b:a", settings.audio_bitrate)
            .option("-movflags", "+faststart")
            .option("-pix_fmt", settings.pixel_format)
            .option("-preset", settings.preset);

        if let Some(rate) = settings.frame_rate {
            cmd = cmd.option("-r", rate.to_string());
        }

        if let Some(title) = config.metadata_title.as_deref().filter(|t| !t.is_empty()) {
            cmd = cmd.option("-metadata", format!("title={}", title));
        }

        cmd.path(destination)
    }

    /// Build version check command
    pub fn version_check(&self) -> ToolCommand {
        ToolCommand::new(&self.binary_path, "Version check").arg("-version")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, QualityProfile};

    fn value_after<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
        args.iter()
            .position(|a| a == flag)
            .and_then(|i| args.get(i + 1))
            .map(|s| s.as_str())
    }

    #[test]
    fn test_default_filter_chain() {
        let config = Config::default();
        assert_eq!(
            filter_chain(&config.editor),
            "pad=iw+50:ih+50:25:25:black,\
             drawtext=fontfile=Debrosee-ALPnL.ttf:text=KGSFLINK:fontsize=12:fontcolor=white:\
             x=(main_w-text_w)/2:y=main_h-50:box=1:boxcolor=black@0.5:boxborderw=5"
        );
    }

    #[test]
    fn test_option_and_graph_escaping() {
        assert_eq!(escape_filter_value("plain text"), "plain text");
        assert_eq!(escape_filter_value("10:30"), r"10\\:30");
        assert_eq!(escape_filter_value("it's"), r"it\\\'s");
        assert_eq!(escape_filter_value("a,b;c[d]"), r"a\,b\;c\[d\]");
        assert_eq!(escape_filter_value(r"C:\fonts"), r"C\\:\\\\fonts");
    }

    #[test]
    fn test_banner_text_is_escaped() {
        let mut banner = Config::default().editor.banner;
        banner.text = "it's 10:30, ok".to_string();
        banner.font_file = "/usr/share/fonts/a,b.ttf".to_string();
        let filter = banner_filter(&banner);

        assert!(filter.contains(r"text=it\\\'s 10\\:30\, ok:fontsize"));
        assert!(filter.contains(r"fontfile=/usr/share/fonts/a\,b.ttf:text"));
    }

    #[test]
    fn test_empty_metadata_title_is_omitted() {
        let mut config = Config::default().editor;
        config.metadata_title = Some(String::new());
        let cmd = EncodeCommandBuilder::new("ffmpeg").transform(Path::new("a.mp4"), Path::new("b.mp4"), &config);
        assert!(!cmd.args.iter().any(|a| a == "-metadata"));
    }

    #[test]
    fn test_standard_profile_command() {
        let config = Config::default().editor;
        let cmd = EncodeCommandBuilder::new("ffmpeg").transform(Path::new("in/a.mp4"), Path::new("out/a.mp4"), &config);

        assert_eq!(cmd.args.first().map(|s| s.as_str()), Some("-y"));
        assert_eq!(value_after(&cmd.args, "-i"), Some("in/a.mp4"));
        assert_eq!(value_after(&cmd.args, "-b:v"), Some("5000k"));
        assert_eq!(value_after(&cmd.args, "-b:a"), Some("192k"));
        assert_eq!(value_after(&cmd.args, "-movflags"), Some("+faststart"));
        assert_eq!(value_after(&cmd.args, "-pix_fmt"), Some("yuv420p"));
        assert_eq!(value_after(&cmd.args, "-metadata"), Some("title=Video created by kgsflink"));
        assert_eq!(value_after(&cmd.args, "-r"), None);
        assert_eq!(cmd.args.last().map(|s| s.as_str()), Some("out/a.mp4"));
    }

    #[test]
    fn test_high_profile_command() {
        let mut config = Config::default().editor;
        config.profile = QualityProfile::High;
        config.metadata_title = None;
        let cmd = EncodeCommandBuilder::new("ffmpeg").transform(Path::new("a.mov"), Path::new("b.mov"), &config);

        assert_eq!(value_after(&cmd.args, "-b:v"), Some("8000k"));
        assert_eq!(value_after(&cmd.args, "-b:a"), Some("320k"));
        assert_eq!(value_after(&cmd.args, "-r"), Some("60"));
        assert!(!cmd.args.iter().any(|a| a == "-metadata"));
    }
}
