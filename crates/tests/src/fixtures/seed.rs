use base64::Engine;
use serde_json::Value;

use super::test_app::TestApp;

pub struct SeededAdmin {
    pub id: String,
    pub email: String,
    pub access_token: String,
    pub refresh_token: String,
}

/// An approved ambassador and the referral code it was given.
pub struct SeededAmbassador {
    pub id: String,
    pub waitlist_id: String,
    pub phone: String,
    pub referral_code: String,
}

/// A tiny solid-colour PNG as an inline `data:` URL.
pub fn photo_data_url(rgb: [u8; 3]) -> String {
    let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
        16,
        16,
        image::Rgb(rgb),
    ));
    let mut buf = std::io::Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png)
        .expect("Failed to encode PNG");
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(buf.into_inner())
    )
}

/// `count` members; the first `with_photos` of them carry a photo.
pub fn members(count: usize, with_photos: usize) -> Vec<Value> {
    (0..count)
        .map(|i| {
            let mut member = serde_json::json!({
                "id": format!("m{}", i + 1),
                "name": format!("Member {}", i + 1),
                "roll_number": format!("{}", i + 1),
            });
            if i < with_photos {
                member["photo"] = Value::String(photo_data_url([
                    (40 * i % 255) as u8,
                    120,
                    200,
                ]));
            }
            member
        })
        .collect()
}

pub fn order_body(members: Vec<Value>, referral_code: Option<&str>) -> Value {
    let mut body = serde_json::json!({
        "group_name": "Class of 2026",
        "customer": {
            "name": "Asha Rao",
            "email": "asha@test.com",
            "phone": "+91 98000 00001",
        },
        "members": members,
        "grid_template": "square",
        "shipping_address": {
            "line1": "1 MG Road",
            "city": "Pune",
            "state": "MH",
            "postal_code": "411001",
        },
    });
    if let Some(code) = referral_code {
        body["referral_code"] = Value::String(code.to_string());
    }
    body
}

pub fn waitlist_body(name: &str, email: &str, phone: &str) -> Value {
    serde_json::json!({
        "name": name,
        "email": email,
        "phone": phone,
        "college": "Fergusson College",
        "city": "Pune",
        "state": "MH",
        "graduation_year": 2027,
    })
}

impl TestApp {
    /// Register an admin and return their auth info.
    pub async fn register_admin(&self, username: &str) -> SeededAdmin {
        let email = format!("{}@test.com", username);
        let resp = self
            .client
            .post(self.url("/api/auth/register"))
            .json(&serde_json::json!({
                "email": email,
                "username": username,
                "display_name": username,
                "password": "Password123!",
            }))
            .send()
            .await
            .expect("Register request failed");

        assert_eq!(
            resp.status().as_u16(),
            201,
            "Register failed: {}",
            resp.text().await.unwrap_or_default()
        );
        let json: Value = resp.json().await.expect("Failed to parse register response");

        SeededAdmin {
            id: json["user"]["id"].as_str().unwrap().to_string(),
            email,
            access_token: json["access_token"].as_str().unwrap().to_string(),
            refresh_token: json["refresh_token"].as_str().unwrap().to_string(),
        }
    }

    /// Create an authenticated request with the given token.
    pub fn auth_get(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client
            .get(self.url(path))
            .header("Authorization", format!("Bearer {}", token))
    }

    pub fn auth_post(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client
            .post(self.url(path))
            .header("Authorization", format!("Bearer {}", token))
    }

    pub fn auth_put(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client
            .put(self.url(path))
            .header("Authorization", format!("Bearer {}", token))
    }

    pub fn auth_delete(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client
            .delete(self.url(path))
            .header("Authorization", format!("Bearer {}", token))
    }

    /// Submit a waitlist application and return the created entry.
    pub async fn apply(&self, name: &str, email: &str, phone: &str) -> Value {
        let resp = self
            .client
            .post(self.url("/api/waitlist"))
            .json(&waitlist_body(name, email, phone))
            .send()
            .await
            .expect("Waitlist request failed");
        assert_eq!(
            resp.status().as_u16(),
            201,
            "Waitlist signup failed: {}",
            resp.text().await.unwrap_or_default()
        );
        resp.json().await.unwrap()
    }

    /// Apply and approve in one go.
    pub async fn seed_ambassador(&self, admin: &SeededAdmin, phone: &str) -> SeededAmbassador {
        let entry = self
            .apply("Ravi Kumar", &format!("amb{}@test.com", phone.trim_start_matches('+')), phone)
            .await;
        let waitlist_id = entry["id"].as_str().unwrap().to_string();

        let resp = self
            .auth_post(
                &format!("/api/admin/waitlist/{}/approve", waitlist_id),
                &admin.access_token,
            )
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 200);
        let json: Value = resp.json().await.unwrap();

        SeededAmbassador {
            id: json["ambassador_id"].as_str().unwrap().to_string(),
            waitlist_id,
            phone: entry["phone"].as_str().unwrap().to_string(),
            referral_code: json["referral_code"].as_str().unwrap().to_string(),
        }
    }

    /// Place a storefront order and return it.
    pub async fn place_order(&self, body: &Value) -> Value {
        let resp = self
            .client
            .post(self.url("/api/order"))
            .json(body)
            .send()
            .await
            .expect("Order request failed");
        assert_eq!(
            resp.status().as_u16(),
            201,
            "Order failed: {}",
            resp.text().await.unwrap_or_default()
        );
        resp.json().await.unwrap()
    }
}
