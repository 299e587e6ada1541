//! Request mode: one HTTP request per row, or per group of rows.
//!
//! ## Substitution scopes
//!
//! | Part | Non-batch | Batch |
//! |------|-----------|-------|
//! | uri, header values | named + row keys | named only |
//! | body | named + row keys | per row: named + row keys |
//! | batch start/end | n/a | named only |

use std::collections::BTreeMap;

use url::Url;

use crate::{
    application::{ApplicationError, services::ParamResolver},
    domain::{Replacements, Request, RequestTemplate, RowTable},
    error::RowplateResult,
};

/// Pull-style queue of rendered requests.
pub struct BatchRequestQueue<'a> {
    template: &'a RequestTemplate,
    table: &'a RowTable,
    resolver: &'a ParamResolver,
    headers: BTreeMap<String, String>,
    named: Replacements,
    batch_size: usize,
    len: usize,
    index: usize,
}

impl<'a> BatchRequestQueue<'a> {
    pub fn new(template: &'a RequestTemplate, table: &'a RowTable, resolver: &'a ParamResolver) -> Self {
        Self::with_headers(template, table, resolver, BTreeMap::new())
    }

    /// Queue whose base headers are extended (and overridden) by `extra`.
    pub fn with_headers(
        template: &'a RequestTemplate,
        table: &'a RowTable,
        resolver: &'a ParamResolver,
        extra: BTreeMap<String, String>,
    ) -> Self {
        let len = table.effective_len();
        let mut headers = template.parsed_headers();
        headers.extend(extra);

        Self {
            template,
            table,
            resolver,
            headers,
            named: resolver.resolve_constant_params(&template.params).values,
            batch_size: if template.is_batch_mode() {
                template.batch.effective_size(len)
            } else {
                1
            },
            len,
            index: 0,
        }
    }

    pub fn has_next(&self) -> bool {
        self.index < self.len
    }

    /// Absolute number of rows consumed so far.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of requests the whole table produces.
    pub fn size(&self) -> usize {
        self.len.div_ceil(self.batch_size)
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn total_rows(&self) -> usize {
        self.len
    }

    /// Render the next request and advance the cursor.
    ///
    /// # Errors
    ///
    /// `InvalidUri` when the rendered URI is not an absolute URL. The
    /// cursor still advances past the rows of the failed request.
    pub fn next_request(&mut self) -> Option<RowplateResult<Request>> {
        if !self.has_next() {
            return None;
        }
        Some(if self.template.is_batch_mode() {
            self.next_batch()
        } else {
            self.next_single()
        })
    }

    fn next_single(&mut self) -> RowplateResult<Request> {
        let row = self.index;
        self.index += 1;

        let mut values = self.named.clone();
        self.resolver.refresh(&self.template.params, &mut values);
        bind_row(&mut values, self.table, row);

        self.request(&values, values.render(self.template.body_text()))
    }

    fn next_batch(&mut self) -> RowplateResult<Request> {
        let start = self.index;
        let end = (start + self.batch_size).min(self.len);
        self.index = end;

        let mut shared = self.named.clone();
        self.resolver.refresh(&self.template.params, &mut shared);

        let mut bodies = Vec::with_capacity(end - start);
        let mut values = shared.clone();
        for row in start..end {
            if row > start {
                self.resolver.refresh(&self.template.params, &mut values);
            }
            bind_row(&mut values, self.table, row);
            bodies.push(values.render(self.template.body_text()));
        }

        let batch = &self.template.batch;
        let body = format!(
            "{}{}{}",
            batch.start.as_deref().map_or_else(String::new, |s| shared.render(s)),
            bodies.join(batch.separator.as_deref().unwrap_or_default()),
            batch.end.as_deref().map_or_else(String::new, |e| shared.render(e)),
        );

        self.request(&shared, body)
    }

    /// Build the request, rendering uri and header values with `values`.
    fn request(&self, values: &Replacements, body: String) -> RowplateResult<Request> {
        let uri = values.render(&self.template.uri);
        let uri = Url::parse(uri.trim()).map_err(|e| ApplicationError::InvalidUri {
            uri: uri.clone(),
            reason: e.to_string(),
        })?;

        let headers = self
            .headers
            .iter()
            .map(|(k, v)| (k.clone(), values.render(v)))
            .collect();

        Ok(Request {
            method: self.template.method,
            uri,
            headers,
            body,
        })
    }
}

fn bind_row(values: &mut Replacements, table: &RowTable, row: usize) {
    values.put_index(row);
    if let Some(cells) = table.row(row) {
        values.put_row(cells);
    }
}

impl Iterator for BatchRequestQueue<'_> {
    type Item = RowplateResult<Request>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_request()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.len - self.index).div_ceil(self.batch_size);
        (remaining, Some(remaining))
    }
}
