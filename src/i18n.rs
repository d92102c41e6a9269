// ABOUTME: Language packs for user-facing notices
// ABOUTME: English and Chinese strings with {placeholder} formatting

use crate::actions::Action;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locale {
    En,
    Zh,
}

impl Locale {
    /// Explicit setting first, then `LC_ALL` / `LANG`
    pub fn detect(setting: Option<&str>) -> Self {
        let from_env = || {
            std::env::var("LC_ALL")
                .ok()
                .filter(|v| !v.is_empty())
                .or_else(|| std::env::var("LANG").ok())
        };

        match setting.map(str::to_string).or_else(from_env) {
            Some(lang) if lang.to_lowercase().starts_with("zh") => Locale::Zh,
            _ => Locale::En,
        }
    }
}

#[derive(Debug, Clone)]
pub struct General {
    pub no_selection: &'static str,
    pub upload_failed: &'static str,
    pub delete_failed: &'static str,
    pub download_failed: &'static str,
    pub no_images_found: &'static str,
    pub file_not_found: &'static str,
    pub not_image_format: &'static str,
    pub api_response_error: &'static str,
    pub network_error: &'static str,
    pub invalid_number: &'static str,
}

#[derive(Debug, Clone)]
pub struct Commands {
    pub upload_image: &'static str,
    pub delete_image: &'static str,
    pub download_image: &'static str,
}

#[derive(Debug, Clone)]
pub struct Results {
    pub success_upload_count: &'static str,
    pub success_delete_count: &'static str,
    pub success_download_count: &'static str,
    pub blacklisted_skipped: &'static str,
    pub limit_skipped: &'static str,
    pub no_images_processed: &'static str,
    pub no_images_deleted: &'static str,
    pub no_images_downloaded: &'static str,
    pub action_upload: &'static str,
    pub action_delete: &'static str,
    pub action_download: &'static str,
}

#[derive(Debug, Clone)]
pub struct Errors {
    pub errors_occurred: &'static str,
    pub delete_errors: &'static str,
    pub download_errors: &'static str,
    pub get_image_failed: &'static str,
    pub image_not_found: &'static str,
    pub image_delete_failed: &'static str,
    pub image_download_failed: &'static str,
    pub invalid_image_url: &'static str,
    pub download_path_not_set: &'static str,
    pub create_folder_failed: &'static str,
    pub trash_failed: &'static str,
    pub search_failed: &'static str,
    pub search_primary: &'static str,
    pub search_fallback: &'static str,
}

#[derive(Debug, Clone)]
pub struct LangPack {
    pub general: General,
    pub commands: Commands,
    pub results: Results,
    pub errors: Errors,
}

pub const EN: LangPack = LangPack {
    general: General {
        no_selection: "Please select a valid image URL first",
        upload_failed: "Image upload failed",
        delete_failed: "Image deletion failed",
        download_failed: "Image download failed",
        no_images_found: "No image links found",
        file_not_found: "File not found",
        not_image_format: "File is not an image format",
        api_response_error: "API response format is incorrect",
        network_error: "Network error",
        invalid_number: "Please enter a valid number",
    },
    commands: Commands {
        upload_image: "Upload to image host",
        delete_image: "Delete from image host",
        download_image: "Download to local storage",
    },
    results: Results {
        success_upload_count: "Successfully uploaded {count} images",
        success_delete_count: "Successfully deleted {count} images",
        success_download_count: "Successfully downloaded {count} images",
        blacklisted_skipped: "Skipped {count} blacklisted domain images",
        limit_skipped: "Selected {action} image count exceeds {limit}, skipped {count} images",
        no_images_processed: "No images found to upload",
        no_images_deleted: "No images were deleted",
        no_images_downloaded: "No images were downloaded",
        action_upload: "upload",
        action_delete: "delete",
        action_download: "download",
    },
    errors: Errors {
        errors_occurred: "Errors occurred",
        delete_errors: "Deletion failed",
        download_errors: "Download failed",
        get_image_failed: "Failed to get image",
        image_not_found: "Corresponding image not found",
        image_delete_failed: "Image deletion failed",
        image_download_failed: "Image download failed",
        invalid_image_url: "Invalid image link",
        download_path_not_set: "Download path not set",
        create_folder_failed: "Failed to create download folder",
        trash_failed: "Failed to remove local image",
        search_failed: "{phase} search failed: {detail}",
        search_primary: "Exact",
        search_fallback: "Broad",
    },
};

pub const ZH: LangPack = LangPack {
    general: General {
        no_selection: "请先选中一个有效的图像URL",
        upload_failed: "图片上传失败",
        delete_failed: "图片删除失败",
        download_failed: "图片下载失败",
        no_images_found: "没有找到图片链接",
        file_not_found: "找不到文件",
        not_image_format: "文件不是图片格式",
        api_response_error: "API响应格式不正确",
        network_error: "网络错误",
        invalid_number: "请输入有效的数字",
    },
    commands: Commands {
        upload_image: "上传图床图片",
        delete_image: "删除图床图片",
        download_image: "下载图床图片",
    },
    results: Results {
        success_upload_count: "成功上传 {count} 张图片",
        success_delete_count: "成功删除了 {count} 张图片",
        success_download_count: "成功下载 {count} 张图片",
        blacklisted_skipped: "跳过黑名单域名图片 {count} 张",
        limit_skipped: "选中{action}图片数量超过 {limit} 张,跳过 {count} 张",
        no_images_processed: "没有找到可上传的图片",
        no_images_deleted: "没有图片被删除",
        no_images_downloaded: "没有图片被下载",
        action_upload: "上传",
        action_delete: "删除",
        action_download: "下载",
    },
    errors: Errors {
        errors_occurred: "存在错误",
        delete_errors: "删除失败",
        download_errors: "下载失败",
        get_image_failed: "获取图片失败",
        image_not_found: "未找到对应的图片",
        image_delete_failed: "图片删除失败",
        image_download_failed: "图片下载失败",
        invalid_image_url: "无效的图片链接",
        download_path_not_set: "下载路径未设置",
        create_folder_failed: "创建下载目录失败",
        trash_failed: "移除本地图片失败",
        search_failed: "{phase}搜索失败: {detail}",
        search_primary: "精确",
        search_fallback: "扩大范围",
    },
};

/// Replace every `{key}` in `template` with its value
pub fn tf(template: &str, params: &[(&str, String)]) -> String {
    let mut out = template.to_string();
    for (key, value) in params {
        out = out.replace(&format!("{{{}}}", key), value);
    }
    out
}

impl LangPack {
    pub fn for_locale(locale: Locale) -> Self {
        match locale {
            Locale::En => EN,
            Locale::Zh => ZH,
        }
    }

    pub fn action_word(&self, action: Action) -> &'static str {
        match action {
            Action::Upload => self.results.action_upload,
            Action::Delete => self.results.action_delete,
            Action::Download => self.results.action_download,
        }
    }

    pub fn success_text(&self, action: Action, count: usize) -> String {
        let template = match action {
            Action::Upload => self.results.success_upload_count,
            Action::Delete => self.results.success_delete_count,
            Action::Download => self.results.success_download_count,
        };
        tf(template, &[("count", count.to_string())])
    }

    pub fn nothing_text(&self, action: Action) -> &'static str {
        match action {
            Action::Upload => self.results.no_images_processed,
            Action::Delete => self.results.no_images_deleted,
            Action::Download => self.results.no_images_downloaded,
        }
    }

    pub fn errors_header(&self, action: Action) -> &'static str {
        match action {
            Action::Upload => self.errors.errors_occurred,
            Action::Delete => self.errors.delete_errors,
            Action::Download => self.errors.download_errors,
        }
    }

    pub fn blacklisted_text(&self, count: usize) -> String {
        tf(self.results.blacklisted_skipped, &[("count", count.to_string())])
    }

    pub fn limit_skipped_text(&self, action: Action, limit: usize, count: usize) -> String {
        tf(
            self.results.limit_skipped,
            &[
                ("action", self.action_word(action).to_string()),
                ("limit", limit.to_string()),
                ("count", count.to_string()),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tf_replaces_placeholders() {
        let text = tf(
            "{a} and {b} and {a}",
            &[("a", "1".to_string()), ("b", "two".to_string())],
        );
        assert_eq!(text, "1 and two and 1");
    }

    #[test]
    fn test_limit_text_uses_pack_action_words() {
        assert_eq!(
            EN.limit_skipped_text(Action::Delete, 1, 3),
            "Selected delete image count exceeds 1, skipped 3 images"
        );
        assert_eq!(
            ZH.limit_skipped_text(Action::Upload, 50, 2),
            "选中上传图片数量超过 50 张,跳过 2 张"
        );
    }

    #[test]
    fn test_locale_setting_wins() {
        assert_eq!(Locale::detect(Some("zh-CN")), Locale::Zh);
        assert_eq!(Locale::detect(Some("en")), Locale::En);
    }
}
