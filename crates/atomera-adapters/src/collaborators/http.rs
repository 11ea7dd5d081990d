//! Cliente `reqwest` del backend de cribado.

use async_trait::async_trait;
use log::debug;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::json;

use super::api::{JobRequest, LigandDetails, LigandUpload, ProteinUpload, RemoteJob, ResultSummary, ScreeningApi};
use crate::error::CollaboratorError;

#[derive(Debug, Clone)]
pub struct HttpScreeningApi {
    base_url: String,
    client: Client,
}

impl HttpScreeningApi {
    /// `base_url` sin el sufijo `/api`, p.ej. `http://localhost:8000`.
    pub fn new(base_url: &str) -> Self {
        Self { base_url: base_url.trim_end_matches('/').to_string(),
               client: Client::new() }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, CollaboratorError> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(CollaboratorError::Api(format!("{status}: {body}")));
        }
        Ok(resp.json::<T>().await?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, CollaboratorError> {
        debug!("GET {}", path);
        let resp = self.client.get(self.url(path)).send().await?;
        Self::decode(resp).await
    }

    async fn post_json<T: DeserializeOwned>(&self,
                                            path: &str,
                                            body: &serde_json::Value)
                                            -> Result<T, CollaboratorError> {
        debug!("POST {}", path);
        let resp = self.client.post(self.url(path)).json(body).send().await?;
        Self::decode(resp).await
    }

    async fn post_form<T: DeserializeOwned>(&self, path: &str, form: Form) -> Result<T, CollaboratorError> {
        debug!("POST {} (multipart)", path);
        let resp = self.client.post(self.url(path)).multipart(form).send().await?;
        Self::decode(resp).await
    }
}

#[async_trait]
impl ScreeningApi for HttpScreeningApi {
    async fn upload_protein(&self, file_name: &str, bytes: Vec<u8>) -> Result<ProteinUpload, CollaboratorError> {
        let form = Form::new().part("file", Part::bytes(bytes).file_name(file_name.to_string()));
        self.post_form("/protein/upload", form).await
    }

    async fn submit_sequence(&self, header: &str, sequence: &str) -> Result<ProteinUpload, CollaboratorError> {
        self.post_json("/protein/sequence", &json!({ "header": header, "sequence": sequence }))
            .await
    }

    async fn upload_ligands(&self, files: Vec<(String, Vec<u8>)>) -> Result<LigandUpload, CollaboratorError> {
        let form = files.into_iter()
                        .fold(Form::new(), |form, (name, bytes)| form.part("files", Part::bytes(bytes).file_name(name)));
        self.post_form("/ligand/upload", form).await
    }

    async fn submit_smiles(&self, smiles: &[String], gen3d: bool) -> Result<LigandUpload, CollaboratorError> {
        self.post_json("/ligand/smiles", &json!({ "smiles_list": smiles, "gen3d": gen3d }))
            .await
    }

    async fn create_job(&self, request: &JobRequest) -> Result<RemoteJob, CollaboratorError> {
        let body = serde_json::to_value(request).map_err(|e| CollaboratorError::Api(e.to_string()))?;
        self.post_json("/jobs", &body).await
    }

    async fn job_status(&self, job_id: &str) -> Result<RemoteJob, CollaboratorError> {
        self.get(&format!("/jobs/{job_id}")).await
    }

    async fn results(&self, job_id: &str) -> Result<ResultSummary, CollaboratorError> {
        self.get(&format!("/jobs/{job_id}/results/summary")).await
    }

    async fn ligand_details(&self, job_id: &str, ligand_id: &str) -> Result<LigandDetails, CollaboratorError> {
        self.get(&format!("/jobs/{job_id}/results/ligand/{ligand_id}")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_prefixed_with_api() {
        let api = HttpScreeningApi::new("http://localhost:8000/");
        assert_eq!(api.url("/jobs/abc"), "http://localhost:8000/api/jobs/abc");
    }
}
